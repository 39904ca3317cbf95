// SPDX-License-Identifier: MPL-2.0
//! Export engine.
//!
//! Renders the edit pipeline into surfaces of arbitrary size, encodes them
//! with the `image` crate and writes the results through [`Downloads`].

use crate::domain::editing::{Dimensions, Quality};
use crate::error::{Error, Result};
use crate::media::filter::FilterStack;
use crate::media::image::SourceImage;
use crate::media::image_transform::Transform;
use crate::media::render::{render, Canvas};
use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::codecs::png::PngEncoder;
use image_rs::codecs::webp::WebPEncoder;
use image_rs::{DynamicImage, Rgb, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy, honours the quality factor).
    #[serde(alias = "jpg")]
    Jpeg,
    /// WebP format (lossless encoder).
    WebP,
}

impl ExportFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::WebP => "webp",
        }
    }

    /// Returns a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG (Lossless)",
            ExportFormat::Jpeg => "JPEG (Lossy)",
            ExportFormat::WebP => "WebP (Lossless)",
        }
    }

    /// Returns all supported formats.
    #[must_use]
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::WebP]
    }

    /// Detects format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<ExportFormat> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "webp" => Some(ExportFormat::WebP),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s.trim())
            .ok_or_else(|| Error::Config(format!("unknown export format '{s}'")))
    }
}

// ==========================================================================
// Encoding
// ==========================================================================

/// Encodes straight-alpha pixels.
///
/// JPEG has no alpha channel, so transparent areas are composited over
/// black. `quality` only affects JPEG.
///
/// # Errors
///
/// Returns [`Error::Image`] if the encoder fails.
pub fn encode(image: &RgbaImage, format: ExportFormat, quality: Quality) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        ExportFormat::Png => {
            DynamicImage::ImageRgba8(image.clone()).write_with_encoder(PngEncoder::new(&mut bytes))?;
        }
        ExportFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.as_percent());
            DynamicImage::ImageRgb8(flatten_on_black(image)).write_with_encoder(encoder)?;
        }
        ExportFormat::WebP => {
            DynamicImage::ImageRgba8(image.clone())
                .write_with_encoder(WebPEncoder::new_lossless(&mut bytes))?;
        }
    }
    Ok(bytes)
}

fn flatten_on_black(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let over = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
        Rgb([over(r), over(g), over(b)])
    })
}

/// Encodes whatever is currently drawn on `canvas`.
///
/// # Errors
///
/// Returns [`Error::Image`] if the encoder fails.
pub fn encode_canvas(canvas: &Canvas, format: ExportFormat, quality: Quality) -> Result<Vec<u8>> {
    encode(&canvas.to_rgba(), format, quality)
}

/// Renders `source` through the pipeline into an exact `dims` surface and
/// encodes it.
///
/// The source is drawn at its native size around the surface center. No
/// aspect correction happens here; the caller chose `dims`.
///
/// # Errors
///
/// Returns [`Error::Image`] if the surface cannot be allocated or the
/// encoder fails.
pub fn export_at(
    source: &SourceImage,
    transform: &Transform,
    filters: &FilterStack,
    dims: Dimensions,
    format: ExportFormat,
    quality: Quality,
) -> Result<Vec<u8>> {
    let mut surface = Canvas::new(dims.width(), dims.height())?;
    render(&mut surface, Some(source), transform, filters);
    encode_canvas(&surface, format, quality)
}

// ==========================================================================
// Size Estimation
// ==========================================================================

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn kilobytes(len: usize) -> u32 {
    (len as f64 / 1024.0).round() as u32
}

/// Estimated JPEG size of the canvas at `quality`, in kilobytes.
///
/// # Errors
///
/// Returns [`Error::Image`] if the encoder fails.
pub fn estimate_kb(canvas: &Canvas, quality: Quality) -> Result<u32> {
    encode_canvas(canvas, ExportFormat::Jpeg, quality).map(|bytes| kilobytes(bytes.len()))
}

/// Approximates the quality factor that yields a `target_kb` JPEG.
///
/// The canvas is encoded once at full quality and size is assumed to scale
/// linearly with quality. This is a heuristic: the real output size can
/// differ noticeably from the target.
///
/// # Errors
///
/// Returns [`Error::Image`] if the encoder fails.
#[allow(clippy::cast_precision_loss)]
pub fn target_quality(canvas: &Canvas, target_kb: u32) -> Result<Quality> {
    let full = estimate_kb(canvas, Quality::new(1.0))?.max(1);
    Ok(Quality::new(target_kb as f32 / full as f32))
}

// ==========================================================================
// File Naming
// ==========================================================================

/// Name of the primary download of the live canvas.
#[must_use]
pub fn edited_filename(format: ExportFormat) -> String {
    format!("edited.{}", format.extension())
}

/// Name of a one-off resized download.
#[must_use]
pub fn resized_filename(dims: Dimensions, format: ExportFormat) -> String {
    format!("resized-{dims}.{}", format.extension())
}

/// Name of an export-target download.
#[must_use]
pub fn target_filename(dims: Dimensions, format: ExportFormat) -> String {
    format!("image-{dims}.{}", format.extension())
}

// ==========================================================================
// Download Sink
// ==========================================================================

/// Directory that receives exported files.
#[derive(Debug, Clone)]
pub struct Downloads {
    dir: PathBuf,
}

impl Downloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` under `name`, replacing any previous file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be created or the
    /// write fails.
    pub async fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "download written");
        Ok(path)
    }
}
