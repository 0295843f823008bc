// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the ViewWindow, the rectangle of the complex plane we are
//! looking at, and the PlaneMapper, which describes the relationship
//! between a rectangle on the integral plane with an origin at 0,0 and
//! that window.
use num::Complex;

use crate::errors::MandelError;

/// Describes the width and height of an integral plane that is assumed
/// to start at 0,0.  All values are non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the column, row of a pixel on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// The rectangle of the complex plane mapped onto the image, with the
/// real part of each point as the x-component and the imaginary part as
/// the y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewWindow {
    /// Left edge.
    pub xmin: f64,
    /// Right edge.
    pub xmax: f64,
    /// Top edge (row 0 of the image).
    pub ymin: f64,
    /// Bottom edge.
    pub ymax: f64,
}

impl ViewWindow {
    /// A window from explicit edges.  The window must have an area.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<ViewWindow, MandelError> {
        if !(xmax > xmin) {
            return Err(MandelError::InvalidView {
                reason: format!("xmax {} is not greater than xmin {}", xmax, xmin),
            });
        }
        if !(ymax > ymin) {
            return Err(MandelError::InvalidView {
                reason: format!("ymax {} is not greater than ymin {}", ymax, ymin),
            });
        }
        Ok(ViewWindow {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// A square window of half-width `scale` around `center`.
    pub fn centered(center: Complex<f64>, scale: f64) -> Result<ViewWindow, MandelError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(MandelError::InvalidView {
                reason: format!("scale must be a positive number, got {}", scale),
            });
        }
        ViewWindow::new(
            center.re - scale,
            center.re + scale,
            center.im - scale,
            center.im + scale,
        )
    }

    /// Width on the complex plane.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height on the complex plane.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// Maps pixels on an integral plane onto points inside a ViewWindow.
#[derive(Debug, Clone)]
pub struct PlaneMapper {
    /// The right-lower hand corner of the integral cartesian plane.
    /// The left-upper is assumed to be at 0,0.
    pub integral_plane: IntegralPlane,
    /// The window on the complex plane.
    pub view: ViewWindow,
}

impl PlaneMapper {
    /// Constructor.  The integral plane must have at least one pixel.
    pub fn new(width: usize, height: usize, view: ViewWindow) -> Result<PlaneMapper, MandelError> {
        if width == 0 || height == 0 {
            return Err(MandelError::InvalidRequest {
                reason: format!("image size {}x{} has no pixels", width, height),
            });
        }
        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            view,
        })
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Given a pixel on the integral plane, return the point on the
    /// complex plane at its upper-left corner.  The multiply-then-divide
    /// order is kept as is; changing it changes the low bits of the
    /// result.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let v = &self.view;
        Complex::new(
            v.xmin + (pixel.0 as f64) * (v.xmax - v.xmin) / (self.integral_plane.0 as f64),
            v.ymin + (pixel.1 as f64) * (v.ymax - v.ymin) / (self.integral_plane.1 as f64),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> ViewWindow {
        ViewWindow::new(xmin, xmax, ymin, ymax).unwrap()
    }

    #[test]
    fn view_fails_on_bad_shape() {
        assert!(ViewWindow::new(1.0, -1.0, -1.0, 1.0).is_err());
        assert!(ViewWindow::new(-1.0, 1.0, 1.0, 1.0).is_err());
        assert!(ViewWindow::new(-1.0, 1.0, 0.0, std::f64::NAN).is_err());
    }

    #[test]
    fn centered_view_is_symmetric() {
        let v = ViewWindow::centered(Complex::new(-0.5, 0.25), 2.0).unwrap();
        assert_eq!(v, window(-2.5, 1.5, -1.75, 2.25));
        assert_eq!(v.width(), 4.0);
        assert_eq!(v.height(), 4.0);
    }

    #[test]
    fn centered_view_rejects_bad_scale() {
        assert!(ViewWindow::centered(Complex::new(0.0, 0.0), 0.0).is_err());
        assert!(ViewWindow::centered(Complex::new(0.0, 0.0), -1.0).is_err());
        assert!(ViewWindow::centered(Complex::new(0.0, 0.0), std::f64::INFINITY).is_err());
    }

    #[test]
    fn planemapper_fails_on_empty_plane() {
        assert!(PlaneMapper::new(0, 4, window(-1.0, 1.0, -1.0, 1.0)).is_err());
        assert!(PlaneMapper::new(4, 0, window(-1.0, 1.0, -1.0, 1.0)).is_err());
    }

    #[test]
    fn pixel_to_point_on_positive_planes() {
        let pm = PlaneMapper::new(5, 5, window(0.0, 5.0, 0.0, 5.0)).unwrap();
        assert_eq!(pm.len(), 25);
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(0.0, 0.0));
        assert_eq!(pm.pixel_to_point(&Pixel(2, 2)), Complex::new(2.0, 2.0));
        assert_eq!(pm.pixel_to_point(&Pixel(4, 4)), Complex::new(4.0, 4.0));
    }

    #[test]
    fn pixel_to_points_on_mixed_planes() {
        let pm = PlaneMapper::new(4, 4, window(-2.0, 2.0, -2.0, 2.0)).unwrap();
        assert_eq!(pm.pixel_to_point(&Pixel(2, 2)), Complex::new(0.0, 0.0));
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(-2.0, -2.0));
        assert_eq!(pm.pixel_to_point(&Pixel(4, 4)), Complex::new(2.0, 2.0));
    }

    #[test]
    fn pixel_to_point_on_non_square_planes() {
        let pm = PlaneMapper::new(10, 3, window(-4.0, 4.0, -4.0, 4.0)).unwrap();
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(-4.0, -4.0));
        let p = pm.pixel_to_point(&Pixel(5, 1));
        assert_eq!(p.re, 0.0);
        assert!((p.im - (-4.0 + 8.0 / 3.0)).abs() < 1e-12);
    }
}
