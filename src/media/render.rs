// SPDX-License-Identifier: MPL-2.0
//! Render engine: draws a source bitmap through the transform and filter
//! stack onto a raster surface.

use crate::domain::geometry::Size;
use crate::error::{Error, Result};
use crate::media::filter::FilterStack;
use crate::media::image::{pixmap_to_rgba, rgba_to_pixmap, SourceImage};
use crate::media::image_transform::Transform;
use image_rs::RgbaImage;
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, PixmapRef};

/// Raster drawing surface. Its pixel size is the raster coordinate space
/// used by crop selections and metadata.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Creates a transparent surface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] when either side is zero or the surface is
    /// too large to allocate.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| Error::Image(format!("invalid canvas size {width}x{height}")))?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Reallocates the surface at a new size. Contents are discarded.
    ///
    /// # Errors
    ///
    /// See [`Canvas::new`].
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if self.width() != width || self.height() != height {
            *self = Self::new(width, height)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    pub fn as_pixmap(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }

    /// Straight-alpha copy of what is currently drawn.
    pub fn to_rgba(&self) -> RgbaImage {
        pixmap_to_rgba(self.as_pixmap())
    }
}

/// Redraws `canvas` from scratch.
///
/// The surface is cleared, `source` is drawn centered through `transform`
/// with bilinear sampling, and `filters` are applied to the drawn layer in
/// their fixed order. Nothing happens when no source is loaded. Identical
/// inputs always produce identical pixels.
pub fn render(
    canvas: &mut Canvas,
    source: Option<&SourceImage>,
    transform: &Transform,
    filters: &FilterStack,
) {
    let Some(source) = source else {
        return;
    };

    canvas.clear();
    let matrix = transform.to_matrix(canvas.size(), source.size());
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    canvas
        .pixmap
        .draw_pixmap(0, 0, source.as_pixmap(), &paint, matrix, None);

    if !filters.is_neutral() {
        let mut layer = canvas.to_rgba();
        filters.apply(&mut layer);
        match rgba_to_pixmap(&layer) {
            Ok(pixmap) => canvas.pixmap = pixmap,
            Err(err) => tracing::warn!(%err, "filter layer could not be written back"),
        }
    }

    tracing::debug!(
        width = canvas.width(),
        height = canvas.height(),
        rotate = transform.rotate_degrees,
        filters = %filters,
        "canvas rendered"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::filter::FilterKind;
    use image_rs::Rgba;

    fn two_tone_source() -> SourceImage {
        // left half red, right half blue
        let img = RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        SourceImage::from_rgba(&img).expect("source")
    }

    #[test]
    fn render_without_source_leaves_canvas_untouched() {
        let mut canvas = Canvas::new(3, 3).expect("canvas");
        render(
            &mut canvas,
            None,
            &Transform::default(),
            &FilterStack::default(),
        );
        assert!(canvas.to_rgba().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn identity_render_copies_source() {
        let source = two_tone_source();
        let mut canvas = Canvas::new(4, 2).expect("canvas");
        render(
            &mut canvas,
            Some(&source),
            &Transform::default(),
            &FilterStack::default(),
        );
        assert_eq!(canvas.to_rgba(), source.to_rgba());
    }

    #[test]
    fn horizontal_flip_swaps_halves() {
        let source = two_tone_source();
        let mut canvas = Canvas::new(4, 2).expect("canvas");
        let transform = Transform {
            flip_horizontal: true,
            ..Transform::default()
        };
        render(&mut canvas, Some(&source), &transform, &FilterStack::default());
        let rgba = canvas.to_rgba();
        assert_eq!(rgba.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(rgba.get_pixel(3, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn render_is_deterministic() {
        let source = two_tone_source();
        let transform = Transform {
            rotate_degrees: 33,
            flip_vertical: true,
            ..Transform::default()
        };
        let mut filters = FilterStack::default();
        filters.set(FilterKind::Sepia, 40.0);
        filters.set(FilterKind::Blur, 1.0);

        let mut a = Canvas::new(6, 6).expect("canvas");
        let mut b = Canvas::new(6, 6).expect("canvas");
        render(&mut a, Some(&source), &transform, &filters);
        render(&mut b, Some(&source), &transform, &filters);
        assert_eq!(a.as_pixmap().data(), b.as_pixmap().data());
    }

    #[test]
    fn filters_apply_to_drawn_layer() {
        let source = two_tone_source();
        let mut canvas = Canvas::new(4, 2).expect("canvas");
        let mut filters = FilterStack::default();
        filters.set(FilterKind::Brightness, 0.0);
        render(&mut canvas, Some(&source), &Transform::default(), &filters);
        assert_eq!(canvas.to_rgba().get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn resize_reallocates_surface() {
        let mut canvas = Canvas::new(4, 4).expect("canvas");
        canvas.resize(8, 2).expect("resize");
        assert_eq!(canvas.size(), Size::new(8, 2));
        assert!(canvas.resize(0, 2).is_err());
    }
}
