// SPDX-License-Identifier: MPL-2.0
//! Image editor controller.
//!
//! [`Editor`] owns one [`EditState`] together with the live canvas, the crop
//! overlay, the undo history, the persistence gateway and the download sink.
//! Every user action is a method: it mutates the state, redraws the canvas,
//! records history for pixel-changing commits and persists the document.
//!
//! Tool-specific operations live next to their state in [`state`]; this
//! module holds loading, adjustments, export of the live canvas and the
//! shared commit path.

pub mod overlay;
pub mod shortcuts;
pub mod state;


pub use overlay::CropOverlay;
pub use shortcuts::{KeyChord, KeyOutcome, Shortcut};
pub use state::{EditState, HistoryStack, PersistedDocument, Theme};

use crate::config;
use crate::domain::editing::Quality;
use crate::domain::geometry::Size;
use crate::error::{EditError, Result};
use crate::media::export::{self, Downloads, ExportFormat};
use crate::media::image::is_image_path;
use crate::media::{render, Canvas, FilterKind, FilterStack, SourceImage, Transform};
use crate::storage::Gateway;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default pause between files of a batch export.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(config::DEFAULT_BATCH_DELAY_MS);

/// Startup options for an [`Editor`].
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    pub history_capacity: usize,
    pub default_quality: Quality,
    pub default_format: ExportFormat,
    pub batch_delay: Duration,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            history_capacity: state::history::DEFAULT_HISTORY_CAPACITY,
            default_quality: Quality::default(),
            default_format: ExportFormat::default(),
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

/// Derived information shown next to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub width: u32,
    pub height: u32,
    /// Estimated JPEG size of the canvas at the current quality.
    pub estimated_kb: u32,
}

pub struct Editor {
    settings: EditorSettings,
    state: EditState,
    canvas: Option<Canvas>,
    overlay: CropOverlay,
    history: HistoryStack,
    gateway: Gateway,
    downloads: Downloads,
    metadata: Option<Metadata>,
}

impl Editor {
    pub fn new(settings: EditorSettings, gateway: Gateway, downloads: Downloads) -> Self {
        let state = EditState {
            quality: settings.default_quality,
            format: settings.default_format,
            ..EditState::default()
        };
        Self {
            history: HistoryStack::new(settings.history_capacity),
            settings,
            state,
            canvas: None,
            overlay: CropOverlay::default(),
            gateway,
            downloads,
            metadata: None,
        }
    }

    // ----------------------------------------------------------------------
    // Accessors
    // ----------------------------------------------------------------------

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn canvas_size(&self) -> Option<Size> {
        self.canvas.as_ref().map(Canvas::size)
    }

    pub fn overlay(&self) -> &CropOverlay {
        &self.overlay
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn downloads(&self) -> &Downloads {
        &self.downloads
    }

    pub fn metadata(&self) -> Option<Metadata> {
        self.metadata
    }

    // ----------------------------------------------------------------------
    // Loading
    // ----------------------------------------------------------------------

    /// Loads an image file.
    ///
    /// Paths that do not look like images are ignored and yield `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::error::Error::Io) if the file cannot be
    /// read and [`Error::Image`](crate::error::Error::Image) if it cannot be
    /// decoded. The previous image stays loaded.
    pub async fn open_path(&mut self, path: &Path) -> Result<bool> {
        if !is_image_path(path) {
            tracing::debug!(path = %path.display(), "ignoring non-image file");
            return Ok(false);
        }
        let bytes = tokio::fs::read(path).await.inspect_err(|err| {
            tracing::warn!(path = %path.display(), %err, "image file could not be read");
        })?;
        self.load_bytes(&bytes).await?;
        tracing::info!(path = %path.display(), "image loaded");
        Ok(true)
    }

    /// Decodes `bytes` and makes them the new source image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`](crate::error::Error::Image) if decoding fails;
    /// nothing changes in that case.
    pub async fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let source = SourceImage::decode(bytes).inspect_err(|err| {
            tracing::warn!(%err, "image could not be decoded");
        })?;
        self.commit_raster(source).await
    }

    // ----------------------------------------------------------------------
    // Non-destructive adjustments
    // ----------------------------------------------------------------------

    pub async fn set_filter(&mut self, kind: FilterKind, value: f32) {
        self.state.filters.set(kind, value);
        self.adjusted().await;
    }

    pub async fn reset_filters(&mut self) {
        self.state.filters = FilterStack::default();
        self.adjusted().await;
    }

    pub async fn set_rotation(&mut self, degrees: i32) {
        self.state.transform.set_rotation(degrees);
        self.adjusted().await;
    }

    pub async fn nudge_rotation(&mut self, delta: i32) {
        self.state.transform.nudge_rotation(delta);
        self.adjusted().await;
    }

    pub async fn toggle_flip_horizontal(&mut self) {
        self.state.transform.toggle_flip_horizontal();
        self.adjusted().await;
    }

    pub async fn toggle_flip_vertical(&mut self) {
        self.state.transform.toggle_flip_vertical();
        self.adjusted().await;
    }

    async fn adjusted(&mut self) {
        self.redraw();
        self.persist().await;
    }

    // ----------------------------------------------------------------------
    // Quality, format and the primary download
    // ----------------------------------------------------------------------

    pub async fn set_quality(&mut self, quality: Quality) {
        self.state.quality = quality;
        self.refresh_metadata();
        self.persist().await;
    }

    /// Picks the quality expected to produce a `target_kb` JPEG.
    ///
    /// Returns `Ok(None)` for a zero target, which leaves the quality as is.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NoImage`] without a canvas, or an encoder error.
    pub async fn apply_target_kb(&mut self, target_kb: u32) -> Result<Option<Quality>> {
        if target_kb == 0 {
            return Ok(None);
        }
        let canvas = self.canvas.as_ref().ok_or(EditError::NoImage)?;
        let quality = export::target_quality(canvas, target_kb)?;
        tracing::debug!(target_kb, quality = quality.value(), "quality targeted");
        self.set_quality(quality).await;
        Ok(Some(quality))
    }

    pub fn set_format(&mut self, format: ExportFormat) {
        self.state.format = format;
    }

    /// Writes the live canvas as `edited.<ext>`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NoImage`], or an encoding or write failure.
    pub async fn download(&self) -> Result<PathBuf> {
        let canvas = self.canvas.as_ref().ok_or(EditError::NoImage)?;
        let bytes = export::encode_canvas(canvas, self.state.format, self.state.quality)?;
        self.downloads
            .save(&export::edited_filename(self.state.format), &bytes)
            .await
    }

    // ----------------------------------------------------------------------
    // Session
    // ----------------------------------------------------------------------

    pub async fn set_theme(&mut self, theme: Theme) {
        self.state.theme = theme;
        self.persist().await;
    }

    pub async fn toggle_theme(&mut self) -> Theme {
        let theme = self.state.theme.toggled();
        self.set_theme(theme).await;
        theme
    }

    /// Restores every adjustment to its default and restarts history from
    /// the current source image. Confirmation is the caller's job.
    pub async fn reset_all(&mut self) {
        self.state.filters = FilterStack::default();
        self.state.transform = Transform::default();
        self.state.quality = self.settings.default_quality;
        self.state.keep_ratio = true;
        self.state.keep_ratio_multi = true;
        self.state.targets.clear();
        self.state.resize = state::ResizeInput::default();
        self.cancel_crop();
        self.history = HistoryStack::new(self.settings.history_capacity);

        if let Some(size) = self.state.source.as_ref().map(SourceImage::size) {
            match self.fit_canvas(size) {
                Ok(()) => {
                    self.redraw();
                    self.push_history();
                    self.refresh_metadata();
                }
                Err(err) => tracing::warn!(%err, "canvas could not be refitted"),
            }
        }
        tracing::info!("editor reset");
        self.persist().await;
    }

    // ----------------------------------------------------------------------
    // Shared pipeline steps
    // ----------------------------------------------------------------------

    /// Makes `source` the new base image: refits the canvas, redraws,
    /// records history, refreshes metadata and persists.
    pub(crate) async fn commit_raster(&mut self, source: SourceImage) -> Result<()> {
        let size = source.size();
        self.fit_canvas(size)?;
        self.state.source = Some(source);
        self.redraw();
        self.push_history();
        self.refresh_metadata();
        self.persist().await;
        Ok(())
    }

    /// Resizes the live canvas to `size`.
    ///
    /// An open crop selection is in raster coordinates of the old canvas, so
    /// it is cancelled whenever the size actually changes.
    pub(crate) fn fit_canvas(&mut self, size: Size) -> Result<()> {
        let resized = self.canvas_size() != Some(size);
        match &mut self.canvas {
            Some(canvas) => canvas.resize(size.width, size.height)?,
            None => self.canvas = Some(Canvas::new(size.width, size.height)?),
        }
        if resized && self.state.crop.is_active() {
            tracing::debug!(
                width = size.width,
                height = size.height,
                "canvas resized, crop selection dropped"
            );
            self.cancel_crop();
        }
        Ok(())
    }

    pub(crate) fn redraw(&mut self) {
        if let Some(canvas) = self.canvas.as_mut() {
            render(
                canvas,
                self.state.source.as_ref(),
                &self.state.transform,
                &self.state.filters,
            );
        }
    }

    pub(crate) fn refresh_metadata(&mut self) {
        let Some(canvas) = self.canvas.as_ref() else {
            self.metadata = None;
            return;
        };
        let estimated_kb = export::estimate_kb(canvas, self.state.quality).unwrap_or_else(|err| {
            tracing::warn!(%err, "size estimate failed");
            0
        });
        self.metadata = Some(Metadata {
            width: canvas.width(),
            height: canvas.height(),
            estimated_kb,
        });
    }
}
