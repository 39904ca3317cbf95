// SPDX-License-Identifier: MPL-2.0
//! `easel` is a non-destructive raster image editing core.
//!
//! A decoded source bitmap is drawn through a geometric transform and a
//! filter stack onto a live canvas. Crop and resize bake the result into a new
//! source, every such commit is recorded in a bounded snapshot history, and the
//! whole session is persisted through a fallback chain of key/value stores.
//! The `easel` binary drives one session from a command script.

pub mod app;
pub mod config;
pub mod domain;
pub mod editor;
pub mod error;
pub mod i18n;
pub mod media;
pub mod storage;

#[cfg(test)]
pub mod test_utils;
