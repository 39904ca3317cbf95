// SPDX-License-Identifier: MPL-2.0
//! Decoded source bitmaps and pixel buffer conversions.
//!
//! The render pipeline works on premultiplied `tiny_skia` pixmaps while the
//! codecs in `image_rs` speak straight-alpha RGBA. The helpers below convert
//! between the two.

use crate::domain::editing::Quality;
use crate::domain::geometry::Size;
use crate::error::{Error, Result};
use crate::media::export::{encode, ExportFormat};
use image_rs::{ImageFormat, Rgba, RgbaImage};
use std::path::Path;
use std::sync::Arc;
use tiny_skia::{ColorU8, Pixmap, PixmapRef};

/// Immutable decoded bitmap used as the base of the edit pipeline.
///
/// Cloning is cheap: the pixels are shared. A new `SourceImage` is created
/// whenever a destructive operation commits; existing ones are never
/// modified.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixmap: Arc<Pixmap>,
}

impl SourceImage {
    /// Decodes any format supported by the `image` crate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the bytes cannot be decoded.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let decoded = image_rs::load_from_memory(bytes)?;
        Self::from_rgba(&decoded.to_rgba8())
    }

    /// Builds a source image from straight-alpha RGBA pixels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] for zero-sized images.
    pub fn from_rgba(image: &RgbaImage) -> Result<Self> {
        rgba_to_pixmap(image).map(Self::from_pixmap)
    }

    /// Wraps an already rasterized pixmap.
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self {
            pixmap: Arc::new(pixmap),
        }
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

    /// Borrow the premultiplied pixels for drawing.
    pub fn as_pixmap(&self) -> PixmapRef<'_> {
        Pixmap::as_ref(&self.pixmap)
    }

    /// Straight-alpha copy of the pixels.
    pub fn to_rgba(&self) -> RgbaImage {
        pixmap_to_rgba(self.as_pixmap())
    }

    /// Lossless PNG encoding of the bitmap, without any filter or transform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if encoding fails.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        encode(&self.to_rgba(), ExportFormat::Png, Quality::default())
    }
}

/// Returns whether a path declares an image type the decoder understands.
pub fn is_image_path(path: &Path) -> bool {
    ImageFormat::from_path(path).is_ok()
}

/// Converts straight-alpha RGBA into a premultiplied pixmap.
pub(crate) fn rgba_to_pixmap(image: &RgbaImage) -> Result<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height()).ok_or_else(|| {
        Error::Image(format!(
            "invalid bitmap size {}x{}",
            image.width(),
            image.height()
        ))
    })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Converts a premultiplied pixmap into straight-alpha RGBA.
pub(crate) fn pixmap_to_rgba(pixmap: PixmapRef<'_>) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn decode_reports_dimensions() {
        let source = SourceImage::decode(&png_bytes(7, 3, [10, 20, 30, 255])).expect("decode");
        assert_eq!(source.width(), 7);
        assert_eq!(source.height(), 3);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = SourceImage::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }

    #[test]
    fn opaque_pixels_survive_premultiply_round_trip() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 255]));
        let source = SourceImage::from_rgba(&img).expect("source");
        assert_eq!(source.to_rgba().get_pixel(1, 1).0, [200, 100, 50, 255]);
    }

    #[test]
    fn png_encoding_decodes_to_same_size() {
        let source = SourceImage::decode(&png_bytes(5, 4, [1, 2, 3, 255])).expect("decode");
        let encoded = source.encode_png().expect("encode");
        let decoded = SourceImage::decode(&encoded).expect("decode again");
        assert_eq!(decoded.size(), source.size());
    }

    #[test]
    fn pixmap_view_shares_premultiplied_pixels() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([200, 100, 50, 128]));
        let source = SourceImage::from_rgba(&img).expect("source");
        let view: PixmapRef<'_> = source.as_pixmap();
        assert_eq!((view.width(), view.height()), (3, 2));
        let pixel = view.pixel(0, 0).expect("pixel");
        assert_eq!(pixel.alpha(), 128);
        assert!(pixel.red() <= 128);
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        let img = RgbaImage::new(0, 0);
        assert!(SourceImage::from_rgba(&img).is_err());
    }

    #[test]
    fn image_type_detection() {
        assert!(is_image_path(Path::new("photo.JPG")));
        assert!(is_image_path(Path::new("photo.webp")));
        assert!(!is_image_path(Path::new("notes.txt")));
    }
}
