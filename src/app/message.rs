// SPDX-License-Identifier: MPL-2.0
//! Shell commands and runtime flags.
//!
//! Every non-empty, non-comment input line parses into one [`Message`]. The
//! grammar is a command word followed by whitespace-separated arguments;
//! text after `#` is ignored.

use crate::domain::geometry::DisplayRect;
use crate::editor::{KeyChord, Theme};
use crate::media::{ExportFormat, FilterKind};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error as ThisError;

/// Runtime flags parsed from the command line.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    /// Optional locale override in BCP-47 form (e.g. `fa`, `en-US`).
    pub lang: Option<String>,
    /// Optional command script; stdin is read when absent.
    pub script: Option<PathBuf>,
    /// Optional data directory override (local store).
    /// Takes precedence over `EASEL_DATA_DIR` environment variable.
    pub data_dir: Option<String>,
    /// Optional config directory override (for settings.toml).
    /// Takes precedence over `EASEL_CONFIG_DIR` environment variable.
    pub config_dir: Option<String>,
    /// Optional host store directory.
    /// Takes precedence over `EASEL_HOST_STORE_DIR` environment variable.
    pub host_store: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Open(PathBuf),
    Filter {
        kind: FilterKind,
        value: f32,
    },
    ResetFilters,
    Rotate(i32),
    Nudge(i32),
    Flip(Axis),
    CropStart,
    /// Pointer event over the crop overlay. Without a display box the
    /// overlay is assumed to be shown at 1:1 at the origin.
    Pointer {
        phase: PointerPhase,
        x: f32,
        y: f32,
        display: Option<DisplayRect>,
    },
    CropApply,
    CropCancel,
    Resize {
        width: Option<u32>,
        height: Option<u32>,
    },
    ResizeDownload {
        width: Option<u32>,
        height: Option<u32>,
    },
    Preset(String),
    KeepRatio(bool),
    KeepRatioMulti(bool),
    DimAdd {
        width: Option<u32>,
        height: Option<u32>,
    },
    /// Zero-based target index.
    DimRemove(usize),
    DimClear,
    DimDownload(usize),
    ExportAll,
    Quality(f32),
    TargetKb(u32),
    Format(ExportFormat),
    Download,
    Undo,
    Redo,
    Key(KeyChord),
    /// Sets the theme, or toggles it when `None`.
    Theme(Option<Theme>),
    /// `confirmed` is set by `reset-all yes`; otherwise the shell asks.
    ResetAll {
        confirmed: bool,
    },
    Info,
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ParseError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("{command}: missing {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("{command}: invalid value {value:?}")]
    InvalidArgument { command: &'static str, value: String },
}

impl ParseError {
    /// Returns the i18n message key for this error.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            ParseError::UnknownCommand(_) => "shell-unknown-command",
            ParseError::MissingArgument { .. } => "shell-missing-argument",
            ParseError::InvalidArgument { .. } => "shell-invalid-argument",
        }
    }
}

type ParseResult<T> = std::result::Result<T, ParseError>;

impl Message {
    /// Parses one input line. Blank lines and comments yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for unknown commands and bad arguments.
    pub fn parse(line: &str) -> ParseResult<Option<Message>> {
        let line = line.split('#').next().unwrap_or_default().trim();
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(None);
        };
        let mut args = Args {
            command: "",
            words,
        };

        let message = match command.to_ascii_lowercase().as_str() {
            "open" => {
                let rest: Vec<&str> = args.words.collect();
                if rest.is_empty() {
                    return Err(missing("open", "path"));
                }
                Message::Open(PathBuf::from(rest.join(" ")))
            }
            "filter" => {
                args.command = "filter";
                let kind = args.parse_with("filter", |s| s.parse::<FilterKind>().ok())?;
                let value = args.required("value")?;
                Message::Filter { kind, value }
            }
            "reset-filters" => Message::ResetFilters,
            "rotate" => {
                args.command = "rotate";
                Message::Rotate(args.required("degrees")?)
            }
            "nudge" => {
                args.command = "nudge";
                Message::Nudge(args.required("degrees")?)
            }
            "flip" => {
                args.command = "flip";
                Message::Flip(args.parse_with("axis", |s| match s {
                    "h" | "x" | "horizontal" => Some(Axis::Horizontal),
                    "v" | "y" | "vertical" => Some(Axis::Vertical),
                    _ => None,
                })?)
            }
            "crop-start" => Message::CropStart,
            "pointer" => {
                args.command = "pointer";
                let phase = args.parse_with("phase", |s| match s {
                    "down" => Some(PointerPhase::Down),
                    "move" => Some(PointerPhase::Move),
                    "up" => Some(PointerPhase::Up),
                    _ => None,
                })?;
                let x = args.required("x")?;
                let y = args.required("y")?;
                let display = match args.optional::<f32>()? {
                    None => None,
                    Some(left) => Some(DisplayRect {
                        left,
                        top: args.required("top")?,
                        width: args.required("width")?,
                        height: args.required("height")?,
                    }),
                };
                Message::Pointer {
                    phase,
                    x,
                    y,
                    display,
                }
            }
            "crop-apply" => Message::CropApply,
            "crop-cancel" => Message::CropCancel,
            "resize" => {
                args.command = "resize";
                let (width, height) = args.size_pair()?;
                Message::Resize { width, height }
            }
            "resize-download" => {
                args.command = "resize-download";
                let (width, height) = args.size_pair()?;
                Message::ResizeDownload { width, height }
            }
            "preset" => {
                args.command = "preset";
                Message::Preset(args.word("ratio")?.to_string())
            }
            "keep-ratio" => {
                args.command = "keep-ratio";
                Message::KeepRatio(args.parse_with("state", parse_switch)?)
            }
            "keep-ratio-multi" => {
                args.command = "keep-ratio-multi";
                Message::KeepRatioMulti(args.parse_with("state", parse_switch)?)
            }
            "dim-add" => {
                args.command = "dim-add";
                let (width, height) = args.size_pair()?;
                Message::DimAdd { width, height }
            }
            "dim-remove" => {
                args.command = "dim-remove";
                Message::DimRemove(args.required("index")?)
            }
            "dim-clear" => Message::DimClear,
            "dim-download" => {
                args.command = "dim-download";
                Message::DimDownload(args.required("index")?)
            }
            "export-all" => Message::ExportAll,
            "quality" => {
                args.command = "quality";
                Message::Quality(args.required("quality")?)
            }
            "target-kb" => {
                args.command = "target-kb";
                Message::TargetKb(args.required("size")?)
            }
            "format" => {
                args.command = "format";
                Message::Format(args.parse_with("format", |s| s.parse::<ExportFormat>().ok())?)
            }
            "download" => Message::Download,
            "undo" => Message::Undo,
            "redo" => Message::Redo,
            "key" => {
                args.command = "key";
                Message::Key(args.parse_with("chord", |s| s.parse::<KeyChord>().ok())?)
            }
            "theme" => {
                args.command = "theme";
                match args.words.next() {
                    None | Some("toggle") => Message::Theme(None),
                    Some("dark") => Message::Theme(Some(Theme::Dark)),
                    Some("light") => Message::Theme(Some(Theme::Light)),
                    Some(other) => return Err(invalid("theme", other)),
                }
            }
            "reset-all" => Message::ResetAll {
                confirmed: matches!(args.words.next(), Some("yes" | "-y" | "--yes")),
            },
            "info" => Message::Info,
            "quit" | "exit" => Message::Quit,
            _ => return Err(ParseError::UnknownCommand(command.to_string())),
        };
        Ok(Some(message))
    }
}

/// Parses a yes/no answer or on/off switch.
pub fn parse_switch(word: &str) -> Option<bool> {
    match word.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "y" | "1" => Some(true),
        "off" | "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn missing(command: &'static str, argument: &'static str) -> ParseError {
    ParseError::MissingArgument { command, argument }
}

fn invalid(command: &'static str, value: &str) -> ParseError {
    ParseError::InvalidArgument {
        command,
        value: value.to_string(),
    }
}

struct Args<'a, I: Iterator<Item = &'a str>> {
    command: &'static str,
    words: I,
}

impl<'a, I: Iterator<Item = &'a str>> Args<'a, I> {
    fn word(&mut self, argument: &'static str) -> ParseResult<&'a str> {
        self.words
            .next()
            .ok_or_else(|| missing(self.command, argument))
    }

    fn parse_with<T>(
        &mut self,
        argument: &'static str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> ParseResult<T> {
        let word = self.word(argument)?;
        parse(word).ok_or_else(|| invalid(self.command, word))
    }

    fn required<T: FromStr>(&mut self, argument: &'static str) -> ParseResult<T> {
        self.parse_with(argument, |s| s.parse().ok())
    }

    fn optional<T: FromStr>(&mut self) -> ParseResult<Option<T>> {
        match self.words.next() {
            None => Ok(None),
            Some(word) => word
                .parse()
                .map(Some)
                .map_err(|_| invalid(self.command, word)),
        }
    }

    /// Width and height, either of which may be `-` or `0` for blank.
    fn size_pair(&mut self) -> ParseResult<(Option<u32>, Option<u32>)> {
        let width = self.side()?;
        let height = self.side()?;
        Ok((width, height))
    }

    fn side(&mut self) -> ParseResult<Option<u32>> {
        match self.words.next() {
            None | Some("-") => Ok(None),
            Some(word) => word
                .parse::<u32>()
                .map(|v| (v > 0).then_some(v))
                .map_err(|_| invalid(self.command, word)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Message {
        Message::parse(line)
            .expect("parse")
            .expect("message expected")
    }

    #[test]
    fn blank_lines_and_comments_are_skipped() {
        assert_eq!(Message::parse(""), Ok(None));
        assert_eq!(Message::parse("   # just a note"), Ok(None));
    }

    #[test]
    fn trailing_comments_are_ignored() {
        assert_eq!(parse("undo # go back"), Message::Undo);
    }

    #[test]
    fn open_keeps_spaces_in_paths() {
        assert_eq!(
            parse("open my photos/cat 1.png"),
            Message::Open(PathBuf::from("my photos/cat 1.png"))
        );
        assert_eq!(
            Message::parse("open"),
            Err(ParseError::MissingArgument {
                command: "open",
                argument: "path"
            })
        );
    }

    #[test]
    fn filters_parse_kind_and_value() {
        assert_eq!(
            parse("filter hue-rotate -45"),
            Message::Filter {
                kind: FilterKind::Hue,
                value: -45.0
            }
        );
        assert!(matches!(
            Message::parse("filter glow 3"),
            Err(ParseError::InvalidArgument { command: "filter", .. })
        ));
    }

    #[test]
    fn pointer_accepts_optional_display_box() {
        assert_eq!(
            parse("pointer down 5 50"),
            Message::Pointer {
                phase: PointerPhase::Down,
                x: 5.0,
                y: 50.0,
                display: None
            }
        );
        assert_eq!(
            parse("pointer up 40 10 0 0 400 300"),
            Message::Pointer {
                phase: PointerPhase::Up,
                x: 40.0,
                y: 10.0,
                display: Some(DisplayRect {
                    left: 0.0,
                    top: 0.0,
                    width: 400.0,
                    height: 300.0
                })
            }
        );
        assert!(Message::parse("pointer up 1 2 3").is_err());
    }

    #[test]
    fn sizes_accept_blank_sides() {
        assert_eq!(
            parse("resize 400 -"),
            Message::Resize {
                width: Some(400),
                height: None
            }
        );
        assert_eq!(
            parse("dim-add 0 300"),
            Message::DimAdd {
                width: None,
                height: Some(300)
            }
        );
        assert_eq!(
            parse("resize-download"),
            Message::ResizeDownload {
                width: None,
                height: None
            }
        );
    }

    #[test]
    fn switches_and_formats() {
        assert_eq!(parse("keep-ratio off"), Message::KeepRatio(false));
        assert_eq!(parse("keep-ratio-multi on"), Message::KeepRatioMulti(true));
        assert_eq!(parse("format jpg"), Message::Format(ExportFormat::Jpeg));
        assert!(Message::parse("format tiff").is_err());
    }

    #[test]
    fn theme_without_argument_toggles() {
        assert_eq!(parse("theme"), Message::Theme(None));
        assert_eq!(parse("theme light"), Message::Theme(Some(Theme::Light)));
    }

    #[test]
    fn reset_all_needs_explicit_yes_to_skip_prompt() {
        assert_eq!(parse("reset-all"), Message::ResetAll { confirmed: false });
        assert_eq!(parse("reset-all yes"), Message::ResetAll { confirmed: true });
    }

    #[test]
    fn key_chords_parse() {
        let Message::Key(chord) = parse("key Ctrl+Shift+Z") else {
            panic!("expected key message");
        };
        assert!(chord.command && chord.shift);
        assert_eq!(chord.key, "z");
    }

    #[test]
    fn unknown_command_is_reported() {
        let err = Message::parse("sharpen 3").unwrap_err();
        assert_eq!(err, ParseError::UnknownCommand("sharpen".into()));
        assert_eq!(err.i18n_key(), "shell-unknown-command");
    }
}
