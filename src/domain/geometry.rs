// SPDX-License-Identifier: MPL-2.0
//! Pure numeric helpers for raster geometry.
//!
//! Everything here works in *raster space*: the pixel grid of the live canvas
//! buffer, which is independent of how large the canvas is displayed on
//! screen. [`DisplayRect`] describes the on-screen box and maps pointer
//! positions back into raster space.

/// Clamps `value` into `[min, max]`.
///
/// Unlike [`f32::clamp`] this never panics when `min > max`; the lower bound
/// wins, matching `max(min, min(max, value))`.
#[must_use]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    min.max(max.min(value))
}

/// A point in raster pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in raster pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalizes two corner points into a rectangle with its origin at the
    /// minimum corner. The order of the points does not matter.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x1 = a.x.min(b.x);
        let y1 = a.y.min(b.y);
        let x2 = a.x.max(b.x);
        let y2 = a.y.max(b.y);
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Returns whether both sides are at least `min` pixels long.
    #[must_use]
    pub fn is_at_least(&self, min: u32) -> bool {
        self.width >= min && self.height >= min
    }
}

/// Raster size of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height. A zero height is treated as 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }
}

/// On-screen bounding box of an interactive surface, in display units.
///
/// The surface may be scaled by the host relative to its pixel buffer, so X
/// and Y get independent scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    /// A display box showing the surface at 1:1 scale at the origin.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn identity(size: Size) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: size.width as f32,
            height: size.height as f32,
        }
    }

    /// Maps a display-space position onto the raster grid of `intrinsic`.
    ///
    /// Uses `intrinsic / displayed` per axis, rounds to the nearest pixel and
    /// clamps into `[0, intrinsic]` (inclusive, so a selection can reach the
    /// far edge).
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn to_raster(&self, client_x: f32, client_y: f32, intrinsic: Size) -> Point {
        let max_x = intrinsic.width as f32;
        let max_y = intrinsic.height as f32;
        let scale_x = if self.width > 0.0 { max_x / self.width } else { 1.0 };
        let scale_y = if self.height > 0.0 { max_y / self.height } else { 1.0 };

        let x = clamp(((client_x - self.left) * scale_x).round(), 0.0, max_x);
        let y = clamp(((client_y - self.top) * scale_y).round(), 0.0, max_y);
        Point::new(x as u32, y as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_relative_eq, F64_EPSILON};

    #[test]
    fn clamp_bounds_value() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(11.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn rect_normalization_ignores_point_order() {
        let p1 = Point::new(5, 50);
        let p2 = Point::new(40, 10);
        let expected = Rect::new(5, 10, 35, 40);
        assert_eq!(Rect::from_corners(p1, p2), expected);
        assert_eq!(Rect::from_corners(p2, p1), expected);
    }

    #[test]
    fn rect_minimum_size_check() {
        assert!(Rect::new(0, 0, 10, 10).is_at_least(10));
        assert!(!Rect::new(0, 0, 10, 9).is_at_least(10));
    }

    #[test]
    fn display_mapping_scales_axes_independently() {
        // 800x600 buffer shown in a 400x150 box at (100, 50)
        let display = DisplayRect {
            left: 100.0,
            top: 50.0,
            width: 400.0,
            height: 150.0,
        };
        let p = display.to_raster(300.0, 125.0, Size::new(800, 600));
        assert_eq!(p, Point::new(400, 300));
    }

    #[test]
    fn display_mapping_clamps_outside_positions() {
        let display = DisplayRect::identity(Size::new(100, 80));
        assert_eq!(
            display.to_raster(-20.0, 500.0, Size::new(100, 80)),
            Point::new(0, 80)
        );
    }

    #[test]
    fn aspect_ratio_guards_zero_height() {
        assert_relative_eq!(Size::new(800, 600).aspect_ratio(), 4.0 / 3.0, epsilon = F64_EPSILON);
        assert_relative_eq!(Size::new(5, 0).aspect_ratio(), 5.0, epsilon = F64_EPSILON);
    }
}
