// SPDX-License-Identifier: MPL-2.0
//! Update logic: runs one [`Message`] against the session's editor and
//! turns the outcome into localized feedback.

use super::message::{Axis, Message, PointerPhase};
use super::Session;
use crate::domain::editing::Quality;
use crate::domain::geometry::{DisplayRect, Size};
use crate::editor::state::MIN_CROP_SIDE;
use crate::editor::{Editor, Metadata, Shortcut};
use crate::error::{EditError, Error, Result};
use crate::i18n::fluent::I18n;
use std::fmt::Display;
use std::path::Path;

/// What the shell prints and whether it stops after this line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: Option<String>,
    pub quit: bool,
}

impl Reply {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            quit: false,
        }
    }

    fn silent() -> Self {
        Self::default()
    }
}

/// Translates `key` with display-formatted arguments.
pub(super) fn say(i18n: &I18n, key: &str, args: &[(&str, &dyn Display)]) -> String {
    let owned: Vec<(&str, String)> = args
        .iter()
        .map(|(name, value)| (*name, value.to_string()))
        .collect();
    let borrowed: Vec<(&str, &str)> = owned
        .iter()
        .map(|(name, value)| (*name, value.as_str()))
        .collect();
    i18n.tr_with_args(key, &borrowed)
}

/// Localized description of an editor error.
pub(super) fn describe_error(i18n: &I18n, err: &Error) -> String {
    let key = err.i18n_key();
    match err {
        Error::Edit(EditError::SelectionTooSmall { width, height }) => say(
            i18n,
            key,
            &[("width", width), ("height", height), ("min", &MIN_CROP_SIDE)],
        ),
        Error::Edit(EditError::DuplicateTarget { width, height }) => {
            say(i18n, key, &[("width", width), ("height", height)])
        }
        Error::Edit(_) => i18n.tr(key),
        Error::Io(detail) | Error::Image(detail) | Error::Config(detail) | Error::Storage(detail) => {
            say(i18n, key, &[("detail", detail)])
        }
    }
}

fn on_off(state: bool) -> &'static str {
    if state {
        "on"
    } else {
        "off"
    }
}

/// Runs `message` and returns the feedback to print.
pub(super) async fn update(session: &mut Session, message: Message) -> Reply {
    let Session {
        editor,
        i18n,
        awaiting_reset,
    } = session;

    dispatch(editor, i18n, awaiting_reset, message)
        .await
        .unwrap_or_else(|err| {
            tracing::debug!(%err, "command failed");
            Reply::text(describe_error(i18n, &err))
        })
}

async fn dispatch(
    editor: &mut Editor,
    i18n: &I18n,
    awaiting_reset: &mut bool,
    message: Message,
) -> Result<Reply> {
    let reply = match message {
        Message::Open(path) => {
            if editor.open_path(&path).await? {
                let meta = editor.metadata().unwrap_or(Metadata {
                    width: 0,
                    height: 0,
                    estimated_kb: 0,
                });
                Reply::text(say(
                    i18n,
                    "shell-loaded",
                    &[("width", &meta.width), ("height", &meta.height)],
                ))
            } else {
                Reply::text(say(i18n, "shell-ignored-file", &[("path", &path.display())]))
            }
        }
        Message::Filter { kind, value } => {
            editor.set_filter(kind, value).await;
            Reply::text(say(
                i18n,
                "shell-filter-set",
                &[("name", &kind.name()), ("value", &value)],
            ))
        }
        Message::ResetFilters => {
            editor.reset_filters().await;
            Reply::text(i18n.tr("shell-filters-reset"))
        }
        Message::Rotate(degrees) => {
            editor.set_rotation(degrees).await;
            rotation_reply(i18n, editor.state().transform.rotate_degrees)
        }
        Message::Nudge(delta) => {
            editor.nudge_rotation(delta).await;
            rotation_reply(i18n, editor.state().transform.rotate_degrees)
        }
        Message::Flip(axis) => {
            let (name, state) = match axis {
                Axis::Horizontal => {
                    editor.toggle_flip_horizontal().await;
                    ("horizontal", editor.state().transform.flip_horizontal)
                }
                Axis::Vertical => {
                    editor.toggle_flip_vertical().await;
                    ("vertical", editor.state().transform.flip_vertical)
                }
            };
            Reply::text(say(
                i18n,
                "shell-flip",
                &[("axis", &name), ("state", &on_off(state))],
            ))
        }
        Message::CropStart => {
            editor.start_crop()?;
            Reply::text(i18n.tr("shell-crop-started"))
        }
        Message::Pointer {
            phase,
            x,
            y,
            display,
        } => {
            let Some(size) = editor.canvas_size() else {
                return Ok(Reply::silent());
            };
            let display = display.unwrap_or_else(|| DisplayRect::identity(size));
            match phase {
                PointerPhase::Down => editor.crop_pointer_down(x, y, display),
                PointerPhase::Move => editor.crop_pointer_move(x, y, display),
                PointerPhase::Up => editor.crop_pointer_up(x, y, display),
            }
            match (phase, editor.state().crop.rect()) {
                (PointerPhase::Up, Some(rect)) => Reply::text(say(
                    i18n,
                    "crop-label",
                    &[("width", &rect.width), ("height", &rect.height)],
                )),
                _ => Reply::silent(),
            }
        }
        Message::CropApply => {
            editor.apply_crop().await?;
            size_reply(i18n, "shell-crop-applied", editor)
        }
        Message::CropCancel => {
            editor.cancel_crop();
            Reply::text(i18n.tr("shell-crop-cancelled"))
        }
        Message::Resize { width, height } => {
            if width.is_some() || height.is_some() {
                editor.set_resize_input(width, height);
            }
            if editor.apply_resize().await? {
                size_reply(i18n, "shell-resized", editor)
            } else {
                Reply::text(i18n.tr("shell-resize-unchanged"))
            }
        }
        Message::ResizeDownload { width, height } => {
            if width.is_some() || height.is_some() {
                editor.set_resize_input(width, height);
            }
            let path = editor.download_resize().await?;
            saved_reply(i18n, &path)
        }
        Message::Preset(code) => {
            let input = editor.apply_preset(&code)?;
            Reply::text(say(
                i18n,
                "shell-preset",
                &[
                    ("width", &input.width.unwrap_or_default()),
                    ("height", &input.height.unwrap_or_default()),
                ],
            ))
        }
        Message::KeepRatio(state) => {
            editor.set_keep_ratio(state).await;
            Reply::text(say(i18n, "shell-keep-ratio", &[("state", &on_off(state))]))
        }
        Message::KeepRatioMulti(state) => {
            editor.set_keep_ratio_multi(state).await;
            Reply::text(say(
                i18n,
                "shell-keep-ratio-multi",
                &[("state", &on_off(state))],
            ))
        }
        Message::DimAdd { width, height } => {
            let dims = editor.add_target(width, height).await?;
            Reply::text(say(
                i18n,
                "shell-target-added",
                &[
                    ("width", &dims.width()),
                    ("height", &dims.height()),
                    ("count", &editor.state().targets.len()),
                ],
            ))
        }
        Message::DimRemove(index) => {
            let dims = editor.remove_target(index).await?;
            Reply::text(say(
                i18n,
                "shell-target-removed",
                &[("width", &dims.width()), ("height", &dims.height())],
            ))
        }
        Message::DimClear => {
            editor.clear_targets().await;
            Reply::text(i18n.tr("shell-targets-cleared"))
        }
        Message::DimDownload(index) => {
            let path = editor.download_target(index).await?;
            saved_reply(i18n, &path)
        }
        Message::ExportAll => {
            let written = editor.export_all().await?;
            Reply::text(say(i18n, "shell-exported", &[("count", &written.len())]))
        }
        Message::Quality(value) => {
            editor.set_quality(Quality::new(value)).await;
            quality_reply(i18n, editor)
        }
        Message::TargetKb(kb) => match editor.apply_target_kb(kb).await? {
            Some(_) => quality_reply(i18n, editor),
            None => Reply::text(i18n.tr("shell-target-kb-ignored")),
        },
        Message::Format(format) => {
            editor.set_format(format);
            Reply::text(say(i18n, "shell-format", &[("format", &format.description())]))
        }
        Message::Download => {
            let path = editor.download().await?;
            saved_reply(i18n, &path)
        }
        Message::Undo => history_reply(i18n, editor.undo().await?, "shell-undo", "shell-nothing-to-undo"),
        Message::Redo => history_reply(i18n, editor.redo().await?, "shell-redo", "shell-nothing-to-redo"),
        Message::Key(chord) => {
            let outcome = editor.handle_key(&chord).await?;
            match outcome.shortcut {
                None => Reply::text(say(i18n, "shell-key-unbound", &[("chord", &chord)])),
                Some(Shortcut::Undo) => history_reply(
                    i18n,
                    outcome.changed,
                    "shell-undo",
                    "shell-nothing-to-undo",
                ),
                Some(Shortcut::Redo) => history_reply(
                    i18n,
                    outcome.changed,
                    "shell-redo",
                    "shell-nothing-to-redo",
                ),
            }
        }
        Message::Theme(theme) => {
            let theme = match theme {
                Some(theme) => {
                    editor.set_theme(theme).await;
                    theme
                }
                None => editor.toggle_theme().await,
            };
            Reply::text(say(i18n, "shell-theme", &[("theme", &theme.as_str())]))
        }
        Message::ResetAll { confirmed: true } => {
            editor.reset_all().await;
            Reply::text(i18n.tr("shell-reset-done"))
        }
        Message::ResetAll { confirmed: false } => {
            *awaiting_reset = true;
            Reply::text(i18n.tr("shell-confirm-reset"))
        }
        Message::Info => info_reply(i18n, editor),
        Message::Quit => Reply {
            text: Some(i18n.tr("shell-bye")),
            quit: true,
        },
    };
    Ok(reply)
}

fn rotation_reply(i18n: &I18n, degrees: i32) -> Reply {
    Reply::text(say(i18n, "shell-rotation", &[("degrees", &degrees)]))
}

fn size_reply(i18n: &I18n, key: &str, editor: &Editor) -> Reply {
    let size = editor.canvas_size().unwrap_or(Size::new(0, 0));
    Reply::text(say(
        i18n,
        key,
        &[("width", &size.width), ("height", &size.height)],
    ))
}

fn saved_reply(i18n: &I18n, path: &Path) -> Reply {
    Reply::text(say(i18n, "shell-saved", &[("path", &path.display())]))
}

fn quality_reply(i18n: &I18n, editor: &Editor) -> Reply {
    let kb = editor.metadata().map_or(0, |meta| meta.estimated_kb);
    Reply::text(say(
        i18n,
        "shell-quality",
        &[
            ("percent", &editor.state().quality.as_percent()),
            ("kb", &kb),
        ],
    ))
}

fn history_reply(i18n: &I18n, changed: bool, done: &str, nothing: &str) -> Reply {
    Reply::text(i18n.tr(if changed { done } else { nothing }))
}

fn info_reply(i18n: &I18n, editor: &Editor) -> Reply {
    let Some(meta) = editor.metadata() else {
        return Reply::text(i18n.tr("shell-info-empty"));
    };
    let state = editor.state();
    let targets: Vec<String> = state.targets.iter().map(|dims| dims.to_string()).collect();
    let targets = if targets.is_empty() {
        "-".to_string()
    } else {
        targets.join(", ")
    };
    let history = editor.history();
    let position = history.pointer().map_or(0, |p| p + 1);
    Reply::text(say(
        i18n,
        "shell-info",
        &[
            ("width", &meta.width),
            ("height", &meta.height),
            ("kb", &meta.estimated_kb),
            ("percent", &state.quality.as_percent()),
            ("format", &state.format.description()),
            ("theme", &state.theme.as_str()),
            ("filters", &state.filters),
            ("degrees", &state.transform.rotate_degrees),
            ("targets", &targets),
            ("position", &position),
            ("entries", &history.len()),
        ],
    ))
}
