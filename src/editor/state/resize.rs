// SPDX-License-Identifier: MPL-2.0
//! Resize inputs, aspect presets and output dimension resolution.

use crate::domain::editing::Dimensions;
use crate::domain::geometry::Size;
use crate::editor::Editor;
use crate::error::{EditError, Error, Result};
use crate::media::export::{self, export_at};
use crate::media::image_transform;
use crate::media::SourceImage;
use std::path::PathBuf;

/// Width and height typed into the resize fields. `None` means blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeInput {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResizeInput {
    /// Builds an input, treating zero as blank.
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            width: width.filter(|w| *w > 0),
            height: height.filter(|h| *h > 0),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }

    /// Resolves the output size against the current canvas.
    ///
    /// With `keep_ratio` and exactly one side given, the other follows the
    /// canvas aspect ratio. A side that is still missing falls back to the
    /// canvas side (or 1 without a canvas). Returns `None` for blank input.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn resolve(&self, keep_ratio: bool, canvas: Option<Size>) -> Option<Dimensions> {
        if self.is_blank() {
            return None;
        }
        let (mut width, mut height) = (self.width, self.height);

        if let (true, Some(size)) = (keep_ratio, canvas) {
            let ratio = size.aspect_ratio();
            match (width, height) {
                (Some(w), None) => height = Some((f64::from(w) / ratio).round() as u32),
                (None, Some(h)) => width = Some((f64::from(h) * ratio).round() as u32),
                _ => {}
            }
        }

        let fallback = canvas.unwrap_or(Size::new(1, 1));
        Some(Dimensions::new(
            width.unwrap_or(fallback.width),
            height.unwrap_or(fallback.height),
        ))
    }
}

/// Parses an aspect preset such as `16:9` into `(a, b)`.
pub fn parse_preset(code: &str) -> Option<(u32, u32)> {
    let (a, b) = code.trim().split_once(':')?;
    let a: u32 = a.trim().parse().ok()?;
    let b: u32 = b.trim().parse().ok()?;
    (a > 0 && b > 0).then_some((a, b))
}

impl Editor {
    pub fn set_resize_input(&mut self, width: Option<u32>, height: Option<u32>) {
        self.state.resize = ResizeInput::new(width, height);
    }

    /// Fills the resize fields from an `a:b` preset: the width is the
    /// canvas width and the height follows the ratio.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NoImage`] without a canvas and
    /// [`EditError::NoDimensions`] for a malformed preset.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply_preset(&mut self, code: &str) -> Result<ResizeInput> {
        let size = self.canvas_size().ok_or(EditError::NoImage)?;
        let (a, b) = parse_preset(code).ok_or(EditError::NoDimensions)?;
        let width = size.width;
        let height = (f64::from(width) * f64::from(b) / f64::from(a)).round() as u32;
        self.state.resize = ResizeInput::new(Some(width), Some(height));
        Ok(self.state.resize)
    }

    /// Scales the rendered canvas into a new source bitmap.
    ///
    /// Returns `Ok(false)` when nothing is loaded or both fields are blank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the scaled surface cannot be produced.
    pub async fn apply_resize(&mut self) -> Result<bool> {
        let Some(canvas) = self.canvas.as_ref() else {
            return Ok(false);
        };
        let Some(dims) = self
            .state
            .resize
            .resolve(self.state.keep_ratio, Some(canvas.size()))
        else {
            return Ok(false);
        };

        let scaled = image_transform::resize(canvas.as_pixmap(), dims.width(), dims.height())
            .ok_or_else(|| Error::Image(format!("cannot allocate {dims} surface")))?;
        tracing::info!(%dims, "resize applied");
        self.commit_raster(SourceImage::from_pixmap(scaled)).await?;
        Ok(true)
    }

    /// Exports the pipeline at the resize dimensions without changing the
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NoImage`], [`EditError::NoDimensions`], or an
    /// encoding or write failure.
    pub async fn download_resize(&mut self) -> Result<PathBuf> {
        let source = self.state.source.as_ref().ok_or(EditError::NoImage)?;
        let dims = self
            .state
            .resize
            .resolve(self.state.keep_ratio, self.canvas_size())
            .ok_or(EditError::NoDimensions)?;
        let bytes = export_at(
            source,
            &self.state.transform,
            &self.state.filters,
            dims,
            self.state.format,
            self.state.quality,
        )?;
        let name = export::resized_filename(dims, self.state.format);
        self.downloads.save(&name, &bytes).await
    }

    pub async fn set_keep_ratio(&mut self, keep: bool) {
        self.state.keep_ratio = keep;
        self.persist().await;
    }

    pub async fn set_keep_ratio_multi(&mut self, keep: bool) {
        self.state.keep_ratio_multi = keep;
        self.persist().await;
    }
}
