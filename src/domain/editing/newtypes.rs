// SPDX-License-Identifier: MPL-2.0
//! Editing newtypes.
//!
//! This module provides type-safe wrappers for editing values,
//! ensuring they are always within valid ranges.

// =============================================================================
// Quality Bounds
// =============================================================================

/// Encoder quality bounds (0.1 to 1.0).
pub mod quality_bounds {
    /// Minimum quality factor.
    pub const MIN: f32 = 0.1;
    /// Maximum quality factor.
    pub const MAX: f32 = 1.0;
    /// Default quality factor.
    pub const DEFAULT: f32 = 0.9;
}

// =============================================================================
// Quality
// =============================================================================

/// Lossy encoder quality factor, guaranteed to be within `0.1..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f32);

impl Quality {
    /// Creates a new quality factor, clamping the value to the valid range.
    /// Non-finite input falls back to the default.
    #[must_use]
    pub fn new(value: f32) -> Self {
        if value.is_finite() {
            Self(value.clamp(quality_bounds::MIN, quality_bounds::MAX))
        } else {
            Self::default()
        }
    }

    /// Returns the raw factor.
    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Returns the factor as an encoder percentage (1–100).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn as_percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(quality_bounds::DEFAULT)
    }
}

// =============================================================================
// Dimensions
// =============================================================================

/// Width/height pair of an export target or resize output.
///
/// Both sides are at least 1 pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Creates dimensions, flooring each side to 1.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    #[must_use]
    pub fn width(self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(self) -> u32 {
        self.height
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
