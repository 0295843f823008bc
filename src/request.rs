// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A RenderRequest fully describes one image.  Once built it is not
//! mutable, so it can be shared read-only by every worker of a render.

use num::Complex;

use crate::errors::MandelError;
use crate::planes::{PlaneMapper, ViewWindow};

/// Everything needed to render one frame.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    plane: PlaneMapper,
    max_iterations: u32,
    worker_count: usize,
}

impl RenderRequest {
    /// Requires the window on the complex plane, the width and height
    /// of the image, the per-point iteration budget, and the number of
    /// worker threads.  None of the integers may be zero.
    pub fn new(
        view: ViewWindow,
        width: usize,
        height: usize,
        max_iterations: u32,
        worker_count: usize,
    ) -> Result<Self, MandelError> {
        if max_iterations == 0 {
            return Err(MandelError::InvalidRequest {
                reason: "maximum iterations must be at least 1".to_string(),
            });
        }
        if worker_count == 0 {
            return Err(MandelError::InvalidRequest {
                reason: "worker count must be at least 1".to_string(),
            });
        }
        Ok(RenderRequest {
            plane: PlaneMapper::new(width, height, view)?,
            max_iterations,
            worker_count,
        })
    }

    /// Shorthand for a square window of half-width `scale` around
    /// `center`.
    pub fn centered(
        center: Complex<f64>,
        scale: f64,
        width: usize,
        height: usize,
        max_iterations: u32,
        worker_count: usize,
    ) -> Result<Self, MandelError> {
        RenderRequest::new(
            ViewWindow::centered(center, scale)?,
            width,
            height,
            max_iterations,
            worker_count,
        )
    }

    /// The mapping from pixels to points.
    pub fn plane(&self) -> &PlaneMapper {
        &self.plane
    }

    /// The window on the complex plane.
    pub fn view(&self) -> ViewWindow {
        self.plane.view
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.plane.integral_plane.0
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.plane.integral_plane.1
    }

    /// Per-point iteration budget.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }
}
