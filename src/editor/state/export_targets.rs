// SPDX-License-Identifier: MPL-2.0
//! User-curated list of export dimensions.

use crate::domain::editing::Dimensions;
use crate::editor::state::resize::ResizeInput;
use crate::editor::Editor;
use crate::error::{EditError, Result};
use crate::media::export::{self, export_at};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted form of one target: `{"w": .., "h": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    pub w: u32,
    pub h: u32,
}

impl From<Dimensions> for TargetEntry {
    fn from(dims: Dimensions) -> Self {
        Self {
            w: dims.width(),
            h: dims.height(),
        }
    }
}

impl From<TargetEntry> for Dimensions {
    fn from(entry: TargetEntry) -> Self {
        Dimensions::new(entry.w, entry.h)
    }
}

/// Ordered export targets without exact duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTargets {
    items: Vec<Dimensions>,
}

impl ExportTargets {
    /// Appends `dims` unless an identical entry exists.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::DuplicateTarget`] for an exact duplicate.
    pub fn add(&mut self, dims: Dimensions) -> std::result::Result<(), EditError> {
        if self.items.contains(&dims) {
            return Err(EditError::DuplicateTarget {
                width: dims.width(),
                height: dims.height(),
            });
        }
        self.items.push(dims);
        Ok(())
    }

    /// Removes the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidTargetSize`] for an out-of-range index.
    pub fn remove(&mut self, index: usize) -> std::result::Result<Dimensions, EditError> {
        if index < self.items.len() {
            Ok(self.items.remove(index))
        } else {
            Err(EditError::InvalidTargetSize)
        }
    }

    pub fn get(&self, index: usize) -> Option<Dimensions> {
        self.items.get(index).copied()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Dimensions> + '_ {
        self.items.iter().copied()
    }

    pub fn to_entries(&self) -> Vec<TargetEntry> {
        self.iter().map(TargetEntry::from).collect()
    }

    /// Rebuilds the list from persisted entries, dropping duplicates.
    pub fn from_entries(entries: &[TargetEntry]) -> Self {
        let mut targets = Self::default();
        for entry in entries {
            let _ = targets.add(Dimensions::from(*entry));
        }
        targets
    }
}

impl Editor {
    /// Adds a target from the multi-export fields.
    ///
    /// With keep-ratio enabled and a canvas present, a blank side follows
    /// the canvas aspect ratio.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NoDimensions`] for blank input and
    /// [`EditError::DuplicateTarget`] for an existing entry.
    pub async fn add_target(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Dimensions> {
        let dims = ResizeInput::new(width, height)
            .resolve(self.state.keep_ratio_multi, self.canvas_size())
            .ok_or(EditError::NoDimensions)?;
        self.state.targets.add(dims)?;
        tracing::debug!(%dims, count = self.state.targets.len(), "export target added");
        self.persist().await;
        Ok(dims)
    }

    /// # Errors
    ///
    /// Returns [`EditError::InvalidTargetSize`] for an out-of-range index.
    pub async fn remove_target(&mut self, index: usize) -> Result<Dimensions> {
        let dims = self.state.targets.remove(index)?;
        self.persist().await;
        Ok(dims)
    }

    pub async fn clear_targets(&mut self) {
        self.state.targets.clear();
        self.persist().await;
    }

    /// Exports one target as `image-<w>x<h>.<ext>`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NoImage`], [`EditError::InvalidTargetSize`], or
    /// an encoding or write failure.
    pub async fn download_target(&mut self, index: usize) -> Result<PathBuf> {
        let dims = self
            .state
            .targets
            .get(index)
            .ok_or(EditError::InvalidTargetSize)?;
        self.download_scaled(dims).await
    }

    async fn download_scaled(&self, dims: Dimensions) -> Result<PathBuf> {
        let source = self.state.source.as_ref().ok_or(EditError::NoImage)?;
        let bytes = export_at(
            source,
            &self.state.transform,
            &self.state.filters,
            dims,
            self.state.format,
            self.state.quality,
        )?;
        let name = export::target_filename(dims, self.state.format);
        self.downloads.save(&name, &bytes).await
    }

    /// Exports every target in order, pausing between files.
    ///
    /// A failing target is logged and skipped; the others still export.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NoImage`] when nothing is loaded.
    pub async fn export_all(&mut self) -> Result<Vec<PathBuf>> {
        if self.state.source.is_none() {
            return Err(EditError::NoImage.into());
        }
        let targets: Vec<Dimensions> = self.state.targets.iter().collect();
        let mut written = Vec::with_capacity(targets.len());

        for (i, dims) in targets.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
            match self.download_scaled(dims).await {
                Ok(path) => written.push(path),
                Err(err) => tracing::warn!(%dims, %err, "batch export skipped a target"),
            }
        }
        tracing::info!(count = written.len(), "batch export finished");
        Ok(written)
    }
}
