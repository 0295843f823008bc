// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can go wrong while rendering a frame or driving a
//! sequence of them.  Nothing here is retried; callers either report
//! the error and exit, or (for the sequencer) record it against the
//! frame and move on.

use failure::Fail;
use std::io;
use std::path::PathBuf;

/// The one error type of the crate.
#[derive(Debug, Fail)]
pub enum MandelError {
    /// The rectangle on the complex plane is empty or inverted.
    #[fail(display = "Invalid view: {}", reason)]
    InvalidView {
        /// What was wrong with it.
        reason: String,
    },

    /// A render request was built with nonsensical parameters.
    #[fail(display = "Invalid render request: {}", reason)]
    InvalidRequest {
        /// What was wrong with it.
        reason: String,
    },

    /// The pixel buffer handed to the tile scheduler is not the size
    /// the request describes.
    #[fail(
        display = "Buffer is {}x{} but the request is {}x{}",
        buffer_width, buffer_height, width, height
    )]
    BufferMismatch {
        /// Width of the buffer.
        buffer_width: usize,
        /// Height of the buffer.
        buffer_height: usize,
        /// Width of the request.
        width: usize,
        /// Height of the request.
        height: usize,
    },

    /// The operating system refused to give us a worker thread.
    #[fail(display = "Could not start worker thread: {}", cause)]
    WorkerSpawn {
        /// The underlying OS error.
        #[fail(cause)]
        cause: io::Error,
    },

    /// A worker thread did not come back cleanly.
    #[fail(display = "Worker {} did not complete", worker)]
    WorkerJoin {
        /// Index of the worker, in row order.
        worker: usize,
    },

    /// A worker thread panicked and was never joined.
    #[fail(display = "A worker thread panicked")]
    WorkerPanic,

    /// The image could not be written.
    #[fail(display = "couldn't write to {}: {}", path, cause)]
    Save {
        /// Where we tried to write.
        path: String,
        /// The underlying OS error.
        #[fail(cause)]
        cause: io::Error,
    },

    /// A frame's unit of work could not be started at all.
    #[fail(display = "Failed to launch frame {}: {}", frame, cause)]
    Launch {
        /// Zero-based frame index.
        frame: usize,
        /// Why.
        #[fail(cause)]
        cause: io::Error,
    },

    /// A frame's unit of work ran but terminated abnormally.
    #[fail(display = "Frame {} exited abnormally: {}", frame, status)]
    AbnormalExit {
        /// Zero-based frame index.
        frame: usize,
        /// Exit status, or a description of the failure.
        status: String,
    },
}

impl MandelError {
    /// Helper for save failures, which always know their path.
    pub fn save<P: Into<PathBuf>>(path: P, cause: io::Error) -> Self {
        MandelError::Save {
            path: path.into().display().to_string(),
            cause,
        }
    }
}
