// SPDX-License-Identifier: MPL-2.0
//! Geometric transform model and raster resampling helpers.

use crate::domain::geometry::{Rect, Size};
use serde::{Deserialize, Serialize};
use tiny_skia::{FilterQuality, IntRect, Pixmap, PixmapPaint, PixmapRef};

// ==========================================================================
// Transform Value Object
// ==========================================================================

/// Rotation and mirroring applied around the image center on every render.
///
/// `rotate_degrees` is unbounded; only its value modulo 360 matters
/// visually. Flips are applied before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    #[serde(rename = "rotate")]
    pub rotate_degrees: i32,
    #[serde(rename = "flipX")]
    pub flip_horizontal: bool,
    #[serde(rename = "flipY")]
    pub flip_vertical: bool,
}

impl Transform {
    /// Sets an absolute rotation.
    pub fn set_rotation(&mut self, degrees: i32) {
        self.rotate_degrees = degrees;
    }

    /// Rotates by `delta` degrees, keeping the sign-preserving remainder
    /// modulo 360 (so `-90` stays `-90` rather than becoming `270`).
    pub fn nudge_rotation(&mut self, delta: i32) {
        self.rotate_degrees = self.rotate_degrees.wrapping_add(delta) % 360;
    }

    pub fn toggle_flip_horizontal(&mut self) {
        self.flip_horizontal = !self.flip_horizontal;
    }

    pub fn toggle_flip_vertical(&mut self) {
        self.flip_vertical = !self.flip_vertical;
    }

    pub fn is_identity(&self) -> bool {
        self.rotate_degrees % 360 == 0 && !self.flip_horizontal && !self.flip_vertical
    }

    /// Builds the drawing matrix that maps source pixels onto a surface.
    ///
    /// The origin moves to the surface center, flips scale each axis by ±1,
    /// the rotation turns clockwise (y points down), and the source is drawn
    /// centered on the origin.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_matrix(&self, surface: Size, source: Size) -> tiny_skia::Transform {
        let radians = (f64::from(self.rotate_degrees) % 360.0).to_radians();
        #[allow(clippy::cast_possible_truncation)]
        let (sin, cos) = (radians.sin() as f32, radians.cos() as f32);
        let rotation = tiny_skia::Transform::from_row(cos, sin, -sin, cos, 0.0, 0.0);

        let scale_x = if self.flip_horizontal { -1.0 } else { 1.0 };
        let scale_y = if self.flip_vertical { -1.0 } else { 1.0 };

        tiny_skia::Transform::from_translate(surface.width as f32 / 2.0, surface.height as f32 / 2.0)
            .pre_scale(scale_x, scale_y)
            .pre_concat(rotation)
            .pre_translate(-(source.width as f32) / 2.0, -(source.height as f32) / 2.0)
    }
}

// ==========================================================================
// Resampling Helpers
// ==========================================================================

/// Copies a region out of a pixmap.
///
/// Returns `None` when the region is empty or not fully inside the pixmap.
pub fn crop(pixmap: PixmapRef<'_>, rect: Rect) -> Option<Pixmap> {
    if rect.x.checked_add(rect.width)? > pixmap.width()
        || rect.y.checked_add(rect.height)? > pixmap.height()
    {
        return None;
    }
    let rect = IntRect::from_xywh(
        i32::try_from(rect.x).ok()?,
        i32::try_from(rect.y).ok()?,
        rect.width,
        rect.height,
    )?;
    pixmap.to_owned().clone_rect(rect)
}

/// Scales a whole pixmap onto a new surface of exactly `width` × `height`.
///
/// Both sides are floored to 1 pixel.
#[allow(clippy::cast_precision_loss)]
pub fn resize(pixmap: PixmapRef<'_>, width: u32, height: u32) -> Option<Pixmap> {
    let width = width.max(1);
    let height = height.max(1);
    let mut out = Pixmap::new(width, height)?;
    let scale = tiny_skia::Transform::from_scale(
        width as f32 / pixmap.width() as f32,
        height as f32 / pixmap.height() as f32,
    );
    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    out.draw_pixmap(0, 0, pixmap, &paint, scale, None);
    Some(out)
}
