// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The pixel store.  A PixelBuffer is a plain row-major block of RGBA
//! bytes.  For parallel rendering it can be cut into disjoint row bands,
//! each of which may be handed to a different thread; the borrow checker
//! guarantees no two bands overlap.

use image::bmp::BMPEncoder;
use image::ColorType;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::mem;
use std::path::Path;

use crate::errors::MandelError;
use crate::escape::Color;
use crate::tiles::RowRange;

const CHANNELS: usize = 4;

/// A width x height grid of colors.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// A black buffer of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        PixelBuffer {
            width,
            height,
            pixels: vec![0 as u8; width * height * CHANNELS],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The raw RGBA bytes, row by row.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Paints the whole buffer one color.
    pub fn reset(&mut self, color: Color) {
        let c = color.channels();
        for pixel in self.pixels.chunks_mut(CHANNELS) {
            pixel.copy_from_slice(&c);
        }
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel {},{} outside {}x{} buffer",
            x,
            y,
            self.width,
            self.height
        );
        (y * self.width + x) * CHANNELS
    }

    /// Sets one pixel.  Panics if the pixel is outside the buffer.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        let o = self.offset(x, y);
        self.pixels[o..o + CHANNELS].copy_from_slice(&color.channels());
    }

    /// Reads one pixel.  Panics if the pixel is outside the buffer.
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        let o = self.offset(x, y);
        let p = &self.pixels[o..o + CHANNELS];
        Color::rgba(p[0], p[1], p[2], p[3])
    }

    /// Cuts the buffer into one mutable band per range.  The ranges must
    /// be contiguous, in order, starting at row 0 and ending at the last
    /// row, which is exactly what `tiles::partition_rows` produces.
    pub fn bands_mut(&mut self, ranges: &[RowRange]) -> Vec<RowBand> {
        let stride = self.width * CHANNELS;
        let width = self.width;
        let mut rest: &mut [u8] = &mut self.pixels;
        let mut bands = Vec::with_capacity(ranges.len());
        let mut expected = 0;
        for range in ranges {
            assert_eq!(range.start, expected, "row bands must be contiguous");
            let (band, tail) = mem::take(&mut rest).split_at_mut(range.len() * stride);
            bands.push(RowBand {
                rows: *range,
                width,
                pixels: band,
            });
            rest = tail;
            expected = range.end;
        }
        assert!(rest.is_empty(), "row bands must cover the whole buffer");
        bands
    }

    /// Writes the buffer to `path` as a 24-bit BMP.  The alpha channel
    /// is dropped.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), MandelError> {
        let path = path.as_ref();
        let rgb: Vec<u8> = self
            .pixels
            .chunks(CHANNELS)
            .flat_map(|p| p[..3].iter().cloned())
            .collect();
        let output = File::create(path).map_err(|e| MandelError::save(path, e))?;
        let mut output = BufWriter::new(output);
        let mut encoder = BMPEncoder::new(&mut output);
        encoder
            .encode(&rgb, self.width as u32, self.height as u32, ColorType::RGB(8))
            .map_err(|e| MandelError::save(path, e))?;
        drop(encoder);
        output.flush().map_err(|e| MandelError::save(path, e))
    }
}

/// A mutable slice of consecutive rows of a PixelBuffer.  Coordinates
/// are absolute (row numbers of the whole image), not band-relative.
#[derive(Debug)]
pub struct RowBand<'a> {
    rows: RowRange,
    width: usize,
    pixels: &'a mut [u8],
}

impl<'a> RowBand<'a> {
    /// The rows this band covers.
    pub fn rows(&self) -> RowRange {
        self.rows
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Sets one pixel.  `y` must fall inside this band's rows.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        assert!(
            x < self.width && self.rows.contains(y),
            "pixel {},{} outside band {:?}",
            x,
            y,
            self.rows
        );
        let o = ((y - self.rows.start) * self.width + x) * CHANNELS;
        self.pixels[o..o + CHANNELS].copy_from_slice(&color.channels());
    }
}
