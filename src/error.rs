// SPDX-License-Identifier: MPL-2.0
use thiserror::Error as ThisError;

#[derive(Debug, Clone, ThisError)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(String),
    #[error("Config Error: {0}")]
    Config(String),
    #[error("Image Error: {0}")]
    Image(String),
    #[error("Storage Error: {0}")]
    Storage(String),
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// User input validation failures.
///
/// These are reported back to the user synchronously and never mutate the
/// edit state. Each variant maps to a localized message.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum EditError {
    /// The operation needs a loaded image.
    #[error("no image loaded")]
    NoImage,

    /// Crop selection is missing or smaller than the minimum on either axis.
    #[error("selection too small ({width}x{height})")]
    SelectionTooSmall { width: u32, height: u32 },

    /// Neither width nor height was supplied.
    #[error("no dimensions supplied")]
    NoDimensions,

    /// The export target list already holds these dimensions.
    #[error("export target {width}x{height} already added")]
    DuplicateTarget { width: u32, height: u32 },

    /// Export target index or size is out of range.
    #[error("invalid export target")]
    InvalidTargetSize,
}

impl EditError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            EditError::NoImage => "error-no-image",
            EditError::SelectionTooSmall { .. } => "error-crop-selection-too-small",
            EditError::NoDimensions => "error-no-dimensions",
            EditError::DuplicateTarget { .. } => "error-duplicate-target",
            EditError::InvalidTargetSize => "error-invalid-target",
        }
    }
}

impl Error {
    /// Returns the i18n key for errors that surface to the user.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            Error::Edit(edit) => edit.i18n_key(),
            Error::Image(_) => "error-image-codec",
            Error::Io(_) => "error-io",
            Error::Config(_) => "error-config",
            Error::Storage(_) => "error-storage",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
