// SPDX-License-Identifier: MPL-2.0
//! Bounded linear undo/redo log over encoded raster snapshots.

use crate::editor::Editor;
use crate::error::Result;
use crate::media::SourceImage;
use std::collections::VecDeque;
use std::sync::Arc;

pub use crate::config::defaults::DEFAULT_HISTORY_CAPACITY;

/// Opaque encoded copy of a full raster.
pub type Snapshot = Arc<[u8]>;

/// Snapshot history with a cursor.
///
/// The cursor always points at a valid entry while the stack is non-empty.
/// Pushing drops every entry after the cursor, appends, and evicts the
/// oldest entry once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<Snapshot>,
    pointer: Option<usize>,
    capacity: usize,
}

impl HistoryStack {
    /// Creates an empty stack. A zero capacity is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            pointer: None,
            capacity,
        }
    }

    pub fn push(&mut self, snapshot: impl Into<Snapshot>) {
        let keep = self.pointer.map_or(0, |p| p + 1);
        self.entries.truncate(keep);
        self.entries.push_back(snapshot.into());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.pointer = Some(self.entries.len() - 1);
    }

    /// Steps back one entry. Returns `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<Snapshot> {
        let snapshot = self.peek_undo()?;
        self.pointer = self.pointer.map(|p| p - 1);
        Some(snapshot)
    }

    /// Steps forward one entry. Returns `None` at the newest entry.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let snapshot = self.peek_redo()?;
        self.pointer = self.pointer.map(|p| p + 1);
        Some(snapshot)
    }

    /// The entry [`HistoryStack::undo`] would return, cursor untouched.
    pub fn peek_undo(&self) -> Option<Snapshot> {
        match self.pointer {
            Some(p) if p > 0 => self.entries.get(p - 1).cloned(),
            _ => None,
        }
    }

    /// The entry [`HistoryStack::redo`] would return, cursor untouched.
    pub fn peek_redo(&self) -> Option<Snapshot> {
        match self.pointer {
            Some(p) if p + 1 < self.entries.len() => self.entries.get(p + 1).cloned(),
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.pointer.is_some_and(|p| p > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.pointer.is_some_and(|p| p + 1 < self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pointer(&self) -> Option<usize> {
        self.pointer
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.pointer.and_then(|p| self.entries.get(p))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.pointer = None;
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl Editor {
    /// Records the current source bitmap as a new history entry.
    ///
    /// Encoding failures are logged; the edit itself already happened.
    pub(crate) fn push_history(&mut self) {
        let Some(source) = &self.state.source else {
            return;
        };
        match source.encode_png() {
            Ok(bytes) => self.history.push(bytes),
            Err(err) => tracing::warn!(%err, "history snapshot could not be encoded"),
        }
    }

    /// Restores the previous snapshot. Filters and the transform keep their
    /// current values.
    ///
    /// Returns `Ok(false)` when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`](crate::error::Error::Image) if the snapshot
    /// cannot be decoded; the current image and the history cursor are kept.
    pub async fn undo(&mut self) -> Result<bool> {
        let Some(snapshot) = self.history.peek_undo() else {
            return Ok(false);
        };
        self.restore_snapshot(&snapshot).await?;
        self.history.undo();
        Ok(true)
    }

    /// Re-applies the next snapshot. See [`Editor::undo`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Editor::undo`].
    pub async fn redo(&mut self) -> Result<bool> {
        let Some(snapshot) = self.history.peek_redo() else {
            return Ok(false);
        };
        self.restore_snapshot(&snapshot).await?;
        self.history.redo();
        Ok(true)
    }

    async fn restore_snapshot(&mut self, snapshot: &[u8]) -> Result<()> {
        let source = SourceImage::decode(snapshot).inspect_err(|err| {
            tracing::warn!(%err, "history snapshot could not be decoded");
        })?;
        tracing::debug!(
            width = source.width(),
            height = source.height(),
            "history snapshot restored"
        );
        self.fit_canvas(source.size())?;
        self.state.source = Some(source);
        self.redraw();
        self.refresh_metadata();
        self.persist().await;
        Ok(())
    }
}
