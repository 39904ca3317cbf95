// SPDX-License-Identifier: MPL-2.0
//! Serialized form of the edit state and session save/restore.
//!
//! The document is JSON with camelCase keys. Every field is optional on the
//! way in: a missing or malformed field keeps the editor's current value, so
//! older or partially written documents still restore what they can.

use crate::domain::editing::Quality;
use crate::domain::geometry::Size;
use crate::editor::state::export_targets::{ExportTargets, TargetEntry};
use crate::editor::state::{EditState, Theme};
use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::media::{FilterStack, SourceImage, Transform};
use crate::storage::DOCUMENT_KEY;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    #[serde(default, deserialize_with = "lenient")]
    pub quality: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    pub keep_ratio: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub keep_ratio_multi: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub filters: Option<FilterStack>,
    #[serde(default, deserialize_with = "lenient")]
    pub transform: Option<Transform>,
    #[serde(default, deserialize_with = "lenient")]
    pub dims: Option<Vec<TargetEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub theme: Option<Theme>,
    /// Source bitmap as a PNG data URL, without filters or transform.
    #[serde(default, deserialize_with = "lenient")]
    pub image_data: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub original_width: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub original_height: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub canvas_width: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub canvas_height: Option<u32>,
}

/// Falls back to `T::default()` when a field has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl PersistedDocument {
    /// Captures `state`. The source image is re-encoded as PNG; an encoding
    /// failure drops the image from the document and is logged.
    pub fn capture(state: &EditState, canvas: Option<Size>) -> Self {
        let image_data = state.source.as_ref().and_then(|source| {
            source
                .encode_png()
                .map(|bytes| encode_data_url(&bytes))
                .inspect_err(|err| tracing::warn!(%err, "source image not persisted"))
                .ok()
        });
        Self {
            quality: Some(state.quality.value()),
            keep_ratio: Some(state.keep_ratio),
            keep_ratio_multi: Some(state.keep_ratio_multi),
            filters: Some(state.filters),
            transform: Some(state.transform),
            dims: Some(state.targets.to_entries()),
            theme: Some(state.theme),
            image_data,
            original_width: state.source.as_ref().map(SourceImage::width),
            original_height: state.source.as_ref().map(SourceImage::height),
            canvas_width: canvas.map(|s| s.width),
            canvas_height: canvas.map(|s| s.height),
        }
    }

    /// Copies the adjustment fields into `state`, leaving absent ones as
    /// they are. The image payload is handled separately.
    pub fn apply_settings(&self, state: &mut EditState) {
        if let Some(quality) = self.quality {
            state.quality = Quality::new(quality);
        }
        if let Some(keep) = self.keep_ratio {
            state.keep_ratio = keep;
        }
        if let Some(keep) = self.keep_ratio_multi {
            state.keep_ratio_multi = keep;
        }
        if let Some(filters) = self.filters {
            state.filters = filters;
        }
        if let Some(transform) = self.transform {
            state.transform = transform;
        }
        if let Some(dims) = &self.dims {
            state.targets = ExportTargets::from_entries(dims);
        }
        if let Some(theme) = self.theme {
            state.theme = theme;
        }
    }

    /// Decodes the stored source bitmap, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] for a malformed data URL and
    /// [`Error::Image`] for undecodable pixels.
    pub fn decode_image(&self) -> Result<Option<SourceImage>> {
        let Some(url) = &self.image_data else {
            return Ok(None);
        };
        let bytes = decode_data_url(url)?;
        SourceImage::decode(&bytes).map(Some)
    }

    /// Canvas size to restore: the recorded source size, else the decoded
    /// bitmap size.
    pub fn restored_canvas_size(&self, source: &SourceImage) -> Size {
        match (self.original_width, self.original_height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Size::new(w, h),
            _ => source.size(),
        }
    }
}

pub fn encode_data_url(png: &[u8]) -> String {
    format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png))
}

/// Extracts the payload of a base64 `data:` URL of any image type.
///
/// # Errors
///
/// Returns [`Error::Storage`] if the URL is not base64 image data.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let (header, payload) = url
        .split_once(',')
        .ok_or_else(|| Error::Storage("data URL has no payload".into()))?;
    if !header.starts_with("data:image/") || !header.ends_with(";base64") {
        return Err(Error::Storage(format!("unsupported data URL header '{header}'")));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|err| Error::Storage(format!("invalid base64 payload: {err}")))
}

impl Editor {
    /// Writes the current document through the gateway. Never fails.
    pub async fn persist(&self) {
        let doc = PersistedDocument::capture(&self.state, self.canvas_size());
        match serde_json::to_value(&doc) {
            Ok(value) => self.gateway.set(DOCUMENT_KEY, &value).await,
            Err(err) => tracing::warn!(%err, "document could not be serialized"),
        }
    }

    /// Reads the persisted document and rebuilds the edit state from it.
    ///
    /// Returns whether an image was restored. Broken documents or images
    /// are logged and leave the corresponding state untouched.
    pub async fn restore(&mut self) -> bool {
        let Some(value) = self.gateway.get(DOCUMENT_KEY).await else {
            return false;
        };
        let doc: PersistedDocument = match serde_json::from_value(value) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(%err, "persisted document ignored");
                return false;
            }
        };
        doc.apply_settings(&mut self.state);

        let source = match doc.decode_image() {
            Ok(Some(source)) => source,
            Ok(None) => return false,
            Err(err) => {
                tracing::warn!(%err, "persisted image could not be restored");
                return false;
            }
        };
        let size = doc.restored_canvas_size(&source);
        self.state.source = Some(source);
        if let Err(err) = self.fit_canvas(size) {
            tracing::warn!(%err, "restored canvas could not be allocated");
            self.state.source = None;
            return false;
        }
        self.redraw();
        self.history.clear();
        self.push_history();
        self.refresh_metadata();
        tracing::info!(width = size.width, height = size.height, "session restored");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::editing::Dimensions;
    use crate::media::FilterKind;
    use image_rs::{Rgba, RgbaImage};
    use serde_json::json;

    fn populated_state() -> EditState {
        let mut state = EditState::default();
        let img = RgbaImage::from_pixel(6, 4, Rgba([9, 8, 7, 255]));
        state.source = Some(SourceImage::from_rgba(&img).expect("source"));
        state.filters.set(FilterKind::Contrast, 140.0);
        state.filters.set(FilterKind::Hue, 30.0);
        state.transform.nudge_rotation(90);
        state.transform.toggle_flip_vertical();
        state.targets.add(Dimensions::new(100, 100)).expect("add");
        state.quality = Quality::new(0.5);
        state.keep_ratio = false;
        state.theme = Theme::Light;
        state
    }

    #[test]
    fn document_uses_camel_case_keys() {
        let doc = PersistedDocument::capture(&populated_state(), Some(Size::new(6, 4)));
        let value = serde_json::to_value(&doc).expect("serialize");
        for key in [
            "quality",
            "keepRatio",
            "keepRatioMulti",
            "filters",
            "transform",
            "dims",
            "theme",
            "imageData",
            "originalWidth",
            "originalHeight",
            "canvasWidth",
            "canvasHeight",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["dims"], json!([{"w": 100, "h": 100}]));
        assert_eq!(value["transform"]["rotate"], 90);
        assert_eq!(value["theme"], "light");
    }

    #[test]
    fn capture_then_apply_round_trips_settings() {
        let original = populated_state();
        let doc = PersistedDocument::capture(&original, Some(Size::new(6, 4)));
        let value = serde_json::to_value(&doc).expect("serialize");
        let parsed: PersistedDocument = serde_json::from_value(value).expect("parse");

        let mut restored = EditState::default();
        parsed.apply_settings(&mut restored);
        assert_eq!(restored.filters, original.filters);
        assert_eq!(restored.transform, original.transform);
        assert_eq!(restored.targets, original.targets);
        assert_eq!(restored.quality, original.quality);
        assert!(!restored.keep_ratio);
        assert_eq!(restored.theme, Theme::Light);

        let image = parsed.decode_image().expect("decode").expect("image");
        assert_eq!(image.size(), Size::new(6, 4));
    }

    #[test]
    fn missing_and_malformed_fields_keep_current_values() {
        let parsed: PersistedDocument = serde_json::from_value(json!({
            "quality": "high",
            "filters": {"sepia": 50},
            "theme": "neon",
        }))
        .expect("parse");
        let mut state = EditState::default();
        parsed.apply_settings(&mut state);

        assert_eq!(state.quality, Quality::default());
        assert_eq!(state.filters.sepia, 50.0);
        assert_eq!(state.filters.brightness, 100.0);
        assert_eq!(state.theme, Theme::Dark);
        assert!(state.keep_ratio);
    }

    #[test]
    fn data_url_round_trip() {
        let url = encode_data_url(&[1, 2, 3]);
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_url(&url).expect("decode"), vec![1, 2, 3]);
    }

    #[test]
    fn data_url_rejects_other_payloads() {
        assert!(decode_data_url("data:text/plain;base64,AAAA").is_err());
        assert!(decode_data_url("data:image/png,raw").is_err());
        assert!(decode_data_url("no comma").is_err());
    }

    #[test]
    fn canvas_size_prefers_recorded_dimensions() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 255]));
        let source = SourceImage::from_rgba(&img).expect("source");
        let doc = PersistedDocument {
            original_width: Some(30),
            original_height: Some(20),
            ..PersistedDocument::default()
        };
        assert_eq!(doc.restored_canvas_size(&source), Size::new(30, 20));
        assert_eq!(
            PersistedDocument::default().restored_canvas_size(&source),
            Size::new(3, 2)
        );
    }
}
