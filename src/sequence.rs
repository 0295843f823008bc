// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The zoom itself: a fixed center and a scale that shrinks by the same
//! amount every frame, from the starting scale down to the goal.

use num::Complex;
use std::path::PathBuf;

use crate::errors::MandelError;

/// One frame of the sequence.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    /// Zero-based position in the sequence.
    pub index: usize,
    /// Center of the view, the same for every frame.
    pub center: Complex<f64>,
    /// Half-width of the view for this frame.
    pub scale: f64,
}

impl Frame {
    /// Where this frame is written: the base name with the frame index
    /// and `.bmp` appended.
    pub fn output_path(&self, base: &str) -> PathBuf {
        PathBuf::from(format!("{}{}.bmp", base, self.index))
    }
}

/// Describes a zoom from `start_scale` to `goal_scale` over
/// `frame_count` frames.
#[derive(Copy, Clone, Debug)]
pub struct FrameSequence {
    center: Complex<f64>,
    start_scale: f64,
    goal_scale: f64,
    frame_count: usize,
}

impl FrameSequence {
    /// There must be at least one frame.
    pub fn new(
        center: Complex<f64>,
        start_scale: f64,
        goal_scale: f64,
        frame_count: usize,
    ) -> Result<Self, MandelError> {
        if frame_count == 0 {
            return Err(MandelError::InvalidRequest {
                reason: "a sequence needs at least one frame".to_string(),
            });
        }
        Ok(FrameSequence {
            center,
            start_scale,
            goal_scale,
            frame_count,
        })
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frame_count
    }

    /// Never true; a sequence always has a first frame.
    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    /// How much the scale shrinks between frames.  Only meaningful with
    /// more than one frame.
    pub fn interval(&self) -> Option<f64> {
        if self.frame_count > 1 {
            Some((self.start_scale - self.goal_scale) / ((self.frame_count - 1) as f64))
        } else {
            None
        }
    }

    /// The frames, in order.
    pub fn frames(&self) -> Frames {
        Frames {
            center: self.center,
            scale: self.start_scale,
            interval: self.interval().unwrap_or(0.0),
            current: 0,
            frame_count: self.frame_count,
        }
    }
}

/// Iterator over the frames of a FrameSequence.  Each frame's scale is
/// the previous frame's scale minus the interval, accumulated step by
/// step.
#[derive(Debug, Clone)]
pub struct Frames {
    center: Complex<f64>,
    scale: f64,
    interval: f64,
    current: usize,
    frame_count: usize,
}

impl Iterator for Frames {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.current >= self.frame_count {
            return None;
        }
        let frame = Frame {
            index: self.current,
            center: self.center,
            scale: self.scale,
        };
        self.current += 1;
        self.scale -= self.interval;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.frame_count - self.current;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Frames {}

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> Complex<f64> {
        Complex::new(-0.11275, 0.89223)
    }

    #[test]
    fn zero_frames_is_an_error() {
        assert!(FrameSequence::new(center(), 2.0, 0.00008, 0).is_err());
    }

    #[test]
    fn fifty_frames_reach_the_goal() {
        let seq = FrameSequence::new(center(), 2.0, 0.00008, 50).unwrap();
        let frames: Vec<Frame> = seq.frames().collect();
        assert_eq!(frames.len(), 50);
        assert_eq!(frames[0].scale, 2.0);
        assert!((frames[49].scale - 0.00008).abs() < 1e-12);
        for pair in frames.windows(2) {
            assert!(pair[1].scale < pair[0].scale);
            assert_eq!(pair[1].index, pair[0].index + 1);
        }
    }

    #[test]
    fn single_frame_uses_the_start_scale() {
        let seq = FrameSequence::new(center(), 2.0, 0.5, 1).unwrap();
        assert_eq!(seq.interval(), None);
        let frames: Vec<Frame> = seq.frames().collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].scale, 2.0);
    }

    #[test]
    fn two_frames_are_start_and_goal() {
        let seq = FrameSequence::new(center(), 2.0, 0.5, 2).unwrap();
        let scales: Vec<f64> = seq.frames().map(|f| f.scale).collect();
        assert_eq!(scales, vec![2.0, 0.5]);
    }

    #[test]
    fn every_frame_keeps_the_center() {
        let seq = FrameSequence::new(center(), 2.0, 0.1, 7).unwrap();
        assert!(seq.frames().all(|f| f.center == center()));
        assert_eq!(seq.frames().len(), 7);
    }

    #[test]
    fn output_paths_carry_the_index() {
        let seq = FrameSequence::new(center(), 2.0, 0.1, 12).unwrap();
        let paths: Vec<PathBuf> = seq.frames().map(|f| f.output_path("zoom/mandel")).collect();
        assert_eq!(paths[0], PathBuf::from("zoom/mandel0.bmp"));
        assert_eq!(paths[11], PathBuf::from("zoom/mandel11.bmp"));
    }
}
