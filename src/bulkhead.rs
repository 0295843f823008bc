// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Admission control for the frame sequencer.  Each frame is rendered
//! by an independent unit of work, either a child process running the
//! single-frame renderer or a thread in this process.  At most
//! `max_concurrent` units run at once; when that many are in flight the
//! launcher blocks until any one of them finishes, then lets exactly one
//! more in.
//!
//! Units are never timed out or cancelled.  A unit that hangs holds its
//! slot for as long as it hangs.

use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};

use crate::errors::MandelError;
use crate::request::RenderRequest;
use crate::sequence::{Frame, FrameSequence};
use crate::tiles::render_to_file;

/// The parameters shared by every frame of a sequence.  Only the scale
/// changes from frame to frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSettings {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Per-point iteration budget.
    pub max_iterations: u32,
    /// Worker threads per frame.
    pub threads: usize,
    /// Output base name; the frame index and `.bmp` are appended.
    pub output: String,
}

impl FrameSettings {
    /// The render request for one frame.
    pub fn request(&self, frame: &Frame) -> Result<RenderRequest, MandelError> {
        RenderRequest::centered(
            frame.center,
            frame.scale,
            self.width,
            self.height,
            self.max_iterations,
            self.threads,
        )
    }

    /// The argument list for the single-frame renderer.  Floats are
    /// written with their shortest exact representation, so the child
    /// sees the same numbers the sequencer computed.
    pub fn arguments(&self, frame: &Frame) -> Vec<String> {
        vec![
            "-x".to_string(),
            frame.center.re.to_string(),
            "-y".to_string(),
            frame.center.im.to_string(),
            "-s".to_string(),
            frame.scale.to_string(),
            "-W".to_string(),
            self.width.to_string(),
            "-H".to_string(),
            self.height.to_string(),
            "-m".to_string(),
            self.max_iterations.to_string(),
            "-o".to_string(),
            frame.output_path(&self.output).display().to_string(),
            "-n".to_string(),
            self.threads.to_string(),
        ]
    }
}

/// A launched unit of work.  `wait` blocks until the unit is done and
/// reports whether it finished cleanly.
pub trait RenderUnit: Send + 'static {
    /// Blocks until the unit terminates.
    fn wait(self) -> Result<(), MandelError>;
}

/// Something that can start the rendering of a frame.
pub trait Launcher {
    /// What a launch produces.
    type Unit: RenderUnit;

    /// Starts rendering `frame` and returns without waiting for it.
    fn launch(&self, frame: &Frame, settings: &FrameSettings) -> Result<Self::Unit, MandelError>;
}

/// A child process running the single-frame renderer.
#[derive(Debug)]
pub struct ChildUnit {
    frame: usize,
    child: Child,
}

impl RenderUnit for ChildUnit {
    fn wait(mut self) -> Result<(), MandelError> {
        let pid = self.child.id();
        match self.child.wait() {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(MandelError::AbnormalExit {
                frame: self.frame,
                status: format!("process {} exited with {}", pid, status),
            }),
            Err(e) => Err(MandelError::AbnormalExit {
                frame: self.frame,
                status: format!("process {} could not be waited on: {}", pid, e),
            }),
        }
    }
}

/// Launches each frame as a separate process.  Arguments are passed as
/// a list, never through a shell.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
}

impl ProcessLauncher {
    /// Uses the renderer at `program`.
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        ProcessLauncher {
            program: program.into(),
        }
    }

    /// Uses the `mandel` executable installed next to the running one,
    /// or the one on the `PATH` if we cannot tell where we are.
    pub fn sibling() -> Self {
        let name = format!("mandel{}", std::env::consts::EXE_SUFFIX);
        match std::env::current_exe() {
            Ok(exe) => ProcessLauncher::new(exe.with_file_name(name)),
            Err(_) => ProcessLauncher::new(name),
        }
    }

    /// The renderer this launcher runs.
    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

impl Launcher for ProcessLauncher {
    type Unit = ChildUnit;

    fn launch(&self, frame: &Frame, settings: &FrameSettings) -> Result<ChildUnit, MandelError> {
        let child = Command::new(&self.program)
            .args(settings.arguments(frame))
            .stdin(Stdio::null())
            .spawn()
            .map_err(|cause| MandelError::Launch {
                frame: frame.index,
                cause,
            })?;
        debug!("frame {} is process {}", frame.index, child.id());
        Ok(ChildUnit {
            frame: frame.index,
            child,
        })
    }
}

/// A thread in this process rendering one frame.
#[derive(Debug)]
pub struct ThreadUnit {
    frame: usize,
    handle: JoinHandle<Result<(), MandelError>>,
}

impl RenderUnit for ThreadUnit {
    fn wait(self) -> Result<(), MandelError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(MandelError::AbnormalExit {
                frame: self.frame,
                status: "render thread panicked".to_string(),
            }),
        }
    }
}

/// Renders each frame on its own thread in this process.  Frames share
/// nothing, so this behaves like the process launcher without the
/// isolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct InProcessLauncher;

impl Launcher for InProcessLauncher {
    type Unit = ThreadUnit;

    fn launch(&self, frame: &Frame, settings: &FrameSettings) -> Result<ThreadUnit, MandelError> {
        let request = settings.request(frame)?;
        let path = frame.output_path(&settings.output);
        let handle = thread::Builder::new()
            .name(format!("frame-{}", frame.index))
            .spawn(move || render_to_file(&request, &path))
            .map_err(|cause| MandelError::Launch {
                frame: frame.index,
                cause,
            })?;
        Ok(ThreadUnit {
            frame: frame.index,
            handle,
        })
    }
}

/// What became of every frame of a sequence.
#[derive(Debug, Default)]
pub struct SequenceReport {
    /// Indices of frames that finished cleanly, in completion order.
    pub completed: Vec<usize>,
    /// Frames that could not be launched or did not finish cleanly.
    pub failed: Vec<(usize, MandelError)>,
}

impl SequenceReport {
    /// True when no frame failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, frame: usize, outcome: Result<(), MandelError>) {
        match outcome {
            Ok(()) => {
                info!("frame {} complete", frame);
                self.completed.push(frame);
            }
            Err(e) => {
                warn!("frame {} failed: {}", frame, e);
                self.failed.push((frame, e));
            }
        }
    }
}

type Completion = (usize, Result<(), MandelError>);

/// A counting gate on active units.  Every admitted unit gets a waiter
/// thread that reports its completion on a channel, so the gate can
/// block on whichever unit finishes first.
pub struct Bulkhead {
    limit: usize,
    active: usize,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
}

impl Bulkhead {
    /// A gate admitting at most `limit` units.
    pub fn new(limit: usize) -> Result<Self, MandelError> {
        if limit == 0 {
            return Err(MandelError::InvalidRequest {
                reason: "at least one concurrent frame is needed".to_string(),
            });
        }
        let (sender, receiver) = unbounded();
        Ok(Bulkhead {
            limit,
            active: 0,
            sender,
            receiver,
        })
    }

    /// Units currently in flight.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Takes ownership of a launched unit.  If that fills the gate,
    /// blocks until some unit completes and records its outcome.
    pub fn admit<U: RenderUnit>(&mut self, frame: usize, unit: U, report: &mut SequenceReport) {
        let sender = self.sender.clone();
        let waiter = thread::Builder::new()
            .name(format!("wait-{}", frame))
            .spawn(move || {
                let outcome = unit.wait();
                // The receiver lives as long as the Bulkhead; nothing to do
                // if it is gone.
                let _ = sender.send((frame, outcome));
            });
        if let Err(cause) = waiter {
            // Without a waiter we cannot hear about this unit again; it
            // keeps running but is not counted.
            error!("could not watch frame {}: {}", frame, cause);
            report.record(frame, Err(MandelError::Launch { frame, cause }));
            return;
        }
        self.active += 1;
        if self.active >= self.limit {
            self.wait_one(report);
        }
    }

    /// Blocks until one active unit completes.
    fn wait_one(&mut self, report: &mut SequenceReport) {
        if self.active == 0 {
            return;
        }
        match self.receiver.recv() {
            Ok((frame, outcome)) => {
                self.active -= 1;
                report.record(frame, outcome);
            }
            // Unreachable while we hold a sender, but never spin on it.
            Err(_) => self.active = 0,
        }
    }

    /// Blocks until every active unit has completed.
    pub fn drain(&mut self, report: &mut SequenceReport) {
        while self.active > 0 {
            self.wait_one(report);
        }
    }
}

/// Renders every frame of `sequence`, in order, with at most
/// `max_concurrent` frames in flight.  A frame that fails is recorded
/// and the sequence carries on.  Returns after every launched frame has
/// finished.
pub fn run_sequence<L: Launcher>(
    launcher: &L,
    sequence: &FrameSequence,
    settings: &FrameSettings,
    max_concurrent: usize,
) -> Result<SequenceReport, MandelError> {
    let mut bulkhead = Bulkhead::new(max_concurrent)?;
    let mut report = SequenceReport::default();

    for frame in sequence.frames() {
        info!(
            "launching frame {} scale={} -> {}",
            frame.index,
            frame.scale,
            frame.output_path(&settings.output).display()
        );
        match launcher.launch(&frame, settings) {
            Ok(unit) => bulkhead.admit(frame.index, unit, &mut report),
            Err(e) => {
                error!("{}", e);
                report.failed.push((frame.index, e));
            }
        }
    }

    bulkhead.drain(&mut report);
    Ok(report)
}
