// SPDX-License-Identifier: MPL-2.0
//! Edit state and the tool-specific pieces it is made of.

pub mod crop;
pub mod export_targets;
pub mod history;
pub mod persistence;
pub mod resize;

pub use crop::{CropPhase, CropSession, MIN_CROP_SIDE};
pub use export_targets::ExportTargets;
pub use history::HistoryStack;
pub use persistence::PersistedDocument;
pub use resize::ResizeInput;

use crate::domain::editing::Quality;
use crate::media::{ExportFormat, FilterStack, SourceImage, Transform};
use serde::{Deserialize, Serialize};

/// Shell color scheme. Stored with the document, otherwise opaque to the
/// editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// The mutable document.
#[derive(Debug, Clone)]
pub struct EditState {
    /// Current base bitmap; `None` until an image is loaded.
    pub source: Option<SourceImage>,
    pub transform: Transform,
    pub filters: FilterStack,
    pub crop: CropSession,
    pub resize: ResizeInput,
    pub targets: ExportTargets,
    pub quality: Quality,
    /// Keep aspect ratio for single resize.
    pub keep_ratio: bool,
    /// Keep aspect ratio when adding export targets.
    pub keep_ratio_multi: bool,
    pub format: ExportFormat,
    pub theme: Theme,
}

impl Default for EditState {
    fn default() -> Self {
        Self {
            source: None,
            transform: Transform::default(),
            filters: FilterStack::default(),
            crop: CropSession::default(),
            resize: ResizeInput::default(),
            targets: ExportTargets::default(),
            quality: Quality::default(),
            keep_ratio: true,
            keep_ratio_multi: true,
            format: ExportFormat::default(),
            theme: Theme::default(),
        }
    }
}

impl EditState {
    pub fn has_image(&self) -> bool {
        self.source.is_some()
    }
}
