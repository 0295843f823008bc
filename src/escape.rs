// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel.  A point on the complex plane is repeatedly
//! squared and offset by itself, and the number of steps it takes for
//! the point to leave the circle of radius two (or the iteration budget,
//! whichever comes first) is turned into a shade of grey.

use num::Complex;

/// An RGBA color.  The alpha channel is always written as zero and is
/// not used for transparency.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Packs four channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }

    /// A grey of the given intensity, alpha zero.
    pub const fn gray(v: u8) -> Color {
        Color::rgba(v, v, v, 0)
    }

    /// Channels in buffer order.
    pub fn channels(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Debug fill for a fresh image.
pub const DARK_BLUE: Color = Color::rgba(0, 0, 255, 0);

/// Counts the iterations at a point, up to `max_iterations`.  The
/// recurrence is written out on the components rather than through
/// complex multiplication so the results match other renderers bit for
/// bit.  A point that starts outside the escape radius has count zero.
pub fn iterations_at_point(point: Complex<f64>, max_iterations: u32) -> u32 {
    let (x0, y0) = (point.re, point.im);
    let (mut x, mut y) = (x0, y0);
    let mut iter = 0;

    while x * x + y * y <= 4.0 && iter < max_iterations {
        let xt = x * x - y * y + x0;
        let yt = 2.0 * x * y + y0;
        x = xt;
        y = yt;
        iter += 1;
    }

    iter
}

/// Scales an iteration count onto grey, with `max_iterations` as white.
pub fn iteration_to_color(iter: u32, max_iterations: u32) -> Color {
    let gray = 255 * u64::from(iter) / u64::from(max_iterations.max(1));
    Color::gray(gray.min(255) as u8)
}

/// The kernel proper: where does this point land, as a color?
#[inline]
pub fn color_at(point: Complex<f64>, max_iterations: u32) -> Color {
    iteration_to_color(iterations_at_point(point, max_iterations), max_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_outside_the_radius_do_not_iterate() {
        for &(x, y) in &[(-4.0, -4.0), (2.1, 0.0), (0.0, -2.5), (1.5, 1.5), (100.0, 3.0)] {
            assert_eq!(iterations_at_point(Complex::new(x, y), 1000), 0);
            assert_eq!(color_at(Complex::new(x, y), 1000), Color::gray(0));
        }
    }

    #[test]
    fn interior_points_use_the_whole_budget() {
        for &m in &[1, 2, 17, 1000] {
            assert_eq!(iterations_at_point(Complex::new(0.0, 0.0), m), m);
            assert_eq!(color_at(Complex::new(0.0, 0.0), m), Color::gray(255));
        }
        assert_eq!(iterations_at_point(Complex::new(-1.0, 0.0), 500), 500);
    }

    #[test]
    fn counts_never_exceed_the_budget() {
        let mut x = -2.0;
        while x <= 2.0 {
            let mut y = -2.0;
            while y <= 2.0 {
                let m = 37;
                assert!(iterations_at_point(Complex::new(x, y), m) <= m);
                y += 0.125;
            }
            x += 0.125;
        }
    }

    #[test]
    fn boundary_of_radius_still_iterates() {
        // |c|^2 == 4 is inside the test, so one step is taken.
        assert_eq!(iterations_at_point(Complex::new(2.0, 0.0), 10), 1);
    }

    #[test]
    fn escaping_point_counts_known_steps() {
        // 1 -> 2 -> 5: |1|^2 and |2|^2 pass, |5|^2 does not.
        assert_eq!(iterations_at_point(Complex::new(1.0, 0.0), 100), 2);
    }

    #[test]
    fn gray_is_floored_and_alpha_is_zero() {
        assert_eq!(iteration_to_color(1, 3), Color::rgba(85, 85, 85, 0));
        assert_eq!(iteration_to_color(2, 3), Color::gray(170));
        assert_eq!(iteration_to_color(999, 1000), Color::gray(254));
        assert_eq!(iteration_to_color(0, 1000).a, 0);
    }
}
