// SPDX-License-Identifier: MPL-2.0
//! Editing domain types.
//!
//! This module provides pure domain types for image editing operations:
//! - [`Quality`]: Lossy encoder quality factor
//! - [`Dimensions`]: Output size of a resize or export target

pub mod newtypes;

pub use newtypes::{Dimensions, Quality};
