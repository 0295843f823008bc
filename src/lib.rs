#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer and zoom-sequence generator
//!
//! The Mandelbrot set is drawn by taking every point on a window of the
//! complex plane, repeatedly squaring it and adding the original point
//! back in, and counting how many steps it takes to run off toward
//! infinity.  That count becomes a shade of grey.
//!
//! A single image is rendered by cutting its rows into bands, one per
//! worker thread, and joining all of them before the image is saved.
//! A zoom is a sequence of such images around a fixed center, each
//! with a slightly smaller window than the last; every frame is an
//! independent unit of work, and only a bounded number of them run at
//! any one time.

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
extern crate num;
extern crate num_cpus;

pub mod buffer;
pub mod bulkhead;
pub mod cli;
pub mod errors;
pub mod escape;
pub mod planes;
pub mod request;
pub mod sequence;
pub mod tiles;

pub use buffer::PixelBuffer;
pub use bulkhead::{run_sequence, FrameSettings, InProcessLauncher, ProcessLauncher, SequenceReport};
pub use errors::MandelError;
pub use escape::{color_at, Color};
pub use planes::ViewWindow;
pub use request::RenderRequest;
pub use sequence::FrameSequence;
pub use tiles::{partition_rows, render, render_to_file, RowRange};
