// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the application. Constants are organized by category.
//!
//! # Categories
//!
//! - **History**: Undo snapshot capacity
//! - **Quality**: Lossy encoder quality
//! - **Export**: Batch export pacing

// ==========================================================================
// History Defaults
// ==========================================================================

/// Number of snapshots kept by the undo history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 40;

/// Smallest accepted history capacity.
pub const MIN_HISTORY_CAPACITY: usize = 1;

/// Largest accepted history capacity. Each entry holds a full PNG.
pub const MAX_HISTORY_CAPACITY: usize = 500;

// ==========================================================================
// Quality Defaults
// ==========================================================================

pub use crate::domain::editing::newtypes::quality_bounds::{
    DEFAULT as DEFAULT_QUALITY, MAX as MAX_QUALITY, MIN as MIN_QUALITY,
};

// ==========================================================================
// Export Defaults
// ==========================================================================

/// Pause between two files of a batch export (milliseconds).
pub const DEFAULT_BATCH_DELAY_MS: u64 = 400;

/// Longest accepted batch pause (milliseconds).
pub const MAX_BATCH_DELAY_MS: u64 = 10_000;
