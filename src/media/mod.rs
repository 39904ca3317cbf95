// SPDX-License-Identifier: MPL-2.0
//! Raster media handling: decoding, the render pipeline and export.
//!
//! Pixels flow through this module in one direction: a decoded
//! [`SourceImage`] is drawn onto a [`Canvas`] through a [`Transform`] and a
//! [`FilterStack`], and canvases are encoded by the export engine.

pub mod export;
pub mod filter;
pub mod image;
pub mod image_transform;
pub mod render;

pub use export::{Downloads, ExportFormat};
pub use filter::{FilterKind, FilterStack};
pub use image::SourceImage;
pub use image_transform::Transform;
pub use render::{render, Canvas};
