// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The tile scheduler.  An image's rows are cut into one contiguous
//! band per worker, every worker runs the escape-time kernel over its
//! own band, and the render is complete only when every worker has
//! been joined.
//!
//! The bands are not balanced round-robin: whatever rows are left over
//! after an even split all go to the first worker.  With realistic
//! thread counts that is a handful of rows, and it keeps both the
//! output and the timing of a render reproducible.

use itertools::iproduct;
use log::debug;
use std::path::Path;

use crate::buffer::{PixelBuffer, RowBand};
use crate::errors::MandelError;
use crate::escape::{color_at, DARK_BLUE};
use crate::planes::Pixel;
use crate::request::RenderRequest;

/// A half-open range of image rows, `start..end`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RowRange {
    /// First row.
    pub start: usize,
    /// One past the last row.
    pub end: usize,
}

impl RowRange {
    /// Constructor.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        RowRange { start, end }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the range has no rows at all, which happens to
    /// trailing workers when there are more workers than rows.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Does this range include row `y`?
    pub fn contains(&self, y: usize) -> bool {
        y >= self.start && y < self.end
    }
}

/// Splits `height` rows into `workers` contiguous ranges.  Every range
/// gets `height / workers` rows and the first one also gets the
/// remainder.
pub fn partition_rows(height: usize, workers: usize) -> Vec<RowRange> {
    assert!(workers > 0, "at least one worker is needed");
    let increment = height / workers;
    let mut end = height % workers;
    let mut start = 0;
    let mut ranges = Vec::with_capacity(workers);
    for _ in 0..workers {
        end += increment;
        ranges.push(RowRange::new(start, end));
        start = end;
    }
    ranges
}

/// Runs the kernel over every pixel of one band.
fn render_band(request: &RenderRequest, band: &mut RowBand) {
    let rows = band.rows();
    let plane = request.plane();
    let max = request.max_iterations();
    for (row, column) in iproduct!(rows.start..rows.end, 0..band.width()) {
        let point = plane.pixel_to_point(&Pixel(column, row));
        band.set_pixel(column, row, color_at(point, max));
    }
}

/// Fills `buffer` with the image described by `request`, using the
/// request's worker count.  Returns only after every worker has been
/// joined.  On error the contents of the buffer are unspecified and it
/// must not be saved.
pub fn render(request: &RenderRequest, buffer: &mut PixelBuffer) -> Result<(), MandelError> {
    if buffer.width() != request.width() || buffer.height() != request.height() {
        return Err(MandelError::BufferMismatch {
            buffer_width: buffer.width(),
            buffer_height: buffer.height(),
            width: request.width(),
            height: request.height(),
        });
    }

    let ranges = partition_rows(request.height(), request.worker_count());
    let bands = buffer.bands_mut(&ranges);

    let outcome = crossbeam::scope(|spawner| -> Result<(), MandelError> {
        let mut handles = Vec::with_capacity(bands.len());
        for (worker, mut band) in bands.into_iter().enumerate() {
            let handle = spawner
                .builder()
                .name(format!("rows-{}", worker))
                .spawn(move |_| {
                    debug!("worker {} starting on rows {:?}", worker, band.rows());
                    render_band(request, &mut band);
                    debug!("worker {} done", worker);
                })
                .map_err(|cause| MandelError::WorkerSpawn { cause })?;
            handles.push(handle);
        }
        for (worker, handle) in handles.into_iter().enumerate() {
            handle
                .join()
                .map_err(|_| MandelError::WorkerJoin { worker })?;
        }
        Ok(())
    });

    match outcome {
        Ok(result) => result,
        Err(_) => Err(MandelError::WorkerPanic),
    }
}

/// The whole of a single-frame render: allocate, paint the debug fill,
/// render, and save.  Nothing is written if the render fails.
pub fn render_to_file<P: AsRef<Path>>(request: &RenderRequest, path: P) -> Result<(), MandelError> {
    let mut buffer = PixelBuffer::new(request.width(), request.height());
    buffer.reset(DARK_BLUE);
    render(request, &mut buffer)?;
    buffer.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::{iteration_to_color, Color};
    use num::Complex;

    fn request(width: usize, height: usize, max: u32, workers: usize) -> RenderRequest {
        RenderRequest::centered(Complex::new(-0.5, 0.0), 1.5, width, height, max, workers).unwrap()
    }

    fn rendered(r: &RenderRequest) -> PixelBuffer {
        let mut pb = PixelBuffer::new(r.width(), r.height());
        pb.reset(DARK_BLUE);
        render(r, &mut pb).unwrap();
        pb
    }

    #[test]
    fn partitions_cover_every_row_once() {
        for height in 1..40 {
            for workers in 1..=height {
                let ranges = partition_rows(height, workers);
                assert_eq!(ranges.len(), workers);
                let mut seen = vec![0; height];
                for r in &ranges {
                    for y in r.start..r.end {
                        seen[y] += 1;
                    }
                }
                assert!(seen.iter().all(|&n| n == 1), "{} rows / {} workers", height, workers);
                for r in &ranges[1..] {
                    assert_eq!(ranges[0].len() - r.len(), height % workers);
                }
            }
        }
    }

    #[test]
    fn remainder_goes_to_the_first_partition() {
        assert_eq!(
            partition_rows(10, 4),
            vec![
                RowRange::new(0, 4),
                RowRange::new(4, 6),
                RowRange::new(6, 8),
                RowRange::new(8, 10),
            ]
        );
    }

    #[test]
    fn more_workers_than_rows_leaves_trailing_workers_idle() {
        let ranges = partition_rows(2, 5);
        assert_eq!(ranges[0], RowRange::new(0, 2));
        assert!(ranges[1..].iter().all(|r| r.is_empty()));
    }

    #[test]
    fn single_worker_takes_everything() {
        assert_eq!(partition_rows(7, 1), vec![RowRange::new(0, 7)]);
    }

    #[test]
    fn every_pixel_is_written() {
        let pb = rendered(&request(13, 11, 20, 3));
        for y in 0..11 {
            for x in 0..13 {
                assert_ne!(pb.get_pixel(x, y), DARK_BLUE);
            }
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let r = request(31, 17, 200, 4);
        assert_eq!(rendered(&r).as_bytes(), rendered(&r).as_bytes());
    }

    #[test]
    fn worker_count_does_not_change_the_image() {
        let serial = rendered(&request(29, 23, 150, 1));
        for &workers in &[2, 3, 5, 7, 23, 30] {
            let parallel = rendered(&request(29, 23, 150, workers));
            assert_eq!(serial, parallel, "{} workers", workers);
        }
    }

    #[test]
    fn small_image_end_to_end() {
        let r = RenderRequest::centered(Complex::new(0.0, 0.0), 4.0, 10, 3, 1, 2).unwrap();
        let pb = rendered(&r);
        assert_eq!(pb.get_pixel(5, 1), iteration_to_color(1, 1));
        assert_eq!(pb.get_pixel(0, 0), iteration_to_color(0, 1));
        assert_eq!(pb.get_pixel(0, 0), Color::gray(0));
    }

    #[test]
    fn mismatched_buffer_is_refused() {
        let r = request(10, 10, 10, 1);
        let mut pb = PixelBuffer::new(10, 9);
        match render(&r, &mut pb) {
            Err(MandelError::BufferMismatch { .. }) => {}
            other => panic!("expected a mismatch, got {:?}", other),
        }
    }

    #[test]
    fn render_to_file_writes_the_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.bmp");
        render_to_file(&request(8, 8, 10, 2), &path).unwrap();
        assert!(path.exists());
    }
}
