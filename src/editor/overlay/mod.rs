// SPDX-License-Identifier: MPL-2.0
//! Feedback surfaces drawn above the live canvas.

pub mod crop;

pub use crop::CropOverlay;
