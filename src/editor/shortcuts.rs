// SPDX-License-Identifier: MPL-2.0
//! Keyboard chord parsing and shortcut resolution.

use crate::editor::Editor;
use crate::error::Result;
use std::fmt;
use std::str::FromStr;

/// A key press with its modifiers. `command` is the platform primary
/// modifier (Ctrl, or Cmd on macOS).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub command: bool,
    pub shift: bool,
    pub alt: bool,
    /// Lower-cased key name, e.g. `"z"` or `"escape"`.
    pub key: String,
}

impl FromStr for KeyChord {
    type Err = String;

    /// Parses `Ctrl+Shift+Z` style chords. Modifier names are
    /// case-insensitive; `Cmd` and `Meta` count as the primary modifier.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut chord = KeyChord {
            command: false,
            shift: false,
            alt: false,
            key: String::new(),
        };
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key, modifiers)) = parts.split_last() else {
            return Err(format!("empty key chord: {s}"));
        };
        for modifier in modifiers {
            match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "cmd" | "command" | "meta" => chord.command = true,
                "shift" => chord.shift = true,
                "alt" | "option" => chord.alt = true,
                other => return Err(format!("unknown modifier: {other}")),
            }
        }
        if key.is_empty() {
            return Err(format!("missing key in chord: {s}"));
        }
        chord.key = key.to_lowercase();
        Ok(chord)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.command {
            f.write_str("Ctrl+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        f.write_str(&self.key.to_uppercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
}

/// Maps a chord to an editor shortcut.
///
/// `Ctrl+Z` undoes; `Ctrl+Y` and `Ctrl+Shift+Z` redo.
pub fn resolve(chord: &KeyChord) -> Option<Shortcut> {
    if !chord.command || chord.alt {
        return None;
    }
    match (chord.key.as_str(), chord.shift) {
        ("z", false) => Some(Shortcut::Undo),
        ("z", true) | ("y", _) => Some(Shortcut::Redo),
        _ => None,
    }
}

/// Result of handling a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    pub shortcut: Option<Shortcut>,
    /// Whether the host should suppress its own handling of the chord.
    pub prevent_default: bool,
    /// Whether the shortcut changed the image.
    pub changed: bool,
}

impl Editor {
    /// Runs the shortcut bound to `chord`, if any.
    ///
    /// # Errors
    ///
    /// Propagates snapshot decode failures from undo/redo.
    pub async fn handle_key(&mut self, chord: &KeyChord) -> Result<KeyOutcome> {
        let Some(shortcut) = resolve(chord) else {
            return Ok(KeyOutcome::default());
        };
        tracing::debug!(%chord, ?shortcut, "shortcut triggered");
        let changed = match shortcut {
            Shortcut::Undo => self.undo().await?,
            Shortcut::Redo => self.redo().await?,
        };
        Ok(KeyOutcome {
            shortcut: Some(shortcut),
            prevent_default: true,
            changed,
        })
    }
}
