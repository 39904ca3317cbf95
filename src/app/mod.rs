// SPDX-License-Identifier: MPL-2.0
//! Headless command shell around one editor session.
//!
//! The shell reads one command per line from a script file or stdin, runs it
//! against the [`Editor`], and prints localized feedback. It owns the pieces
//! the editor core leaves to its host: file picking, the reset confirmation
//! and theme toggling.

mod message;
pub mod paths;
mod update;

pub use message::{parse_switch, Axis, Flags, Message, ParseError, PointerPhase};
pub use update::Reply;

use crate::config;
use crate::editor::Editor;
use crate::error::Result;
use crate::i18n::fluent::I18n;
use crate::media::Downloads;
use crate::storage::Gateway;
use std::fmt;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// One interactive editing session: the editor plus shell-side state.
pub struct Session {
    editor: Editor,
    i18n: I18n,
    /// Set after `reset-all` until the next line answers the prompt.
    awaiting_reset: bool,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("locale", self.i18n.current_locale())
            .field("has_image", &self.editor.state().has_image())
            .field("awaiting_reset", &self.awaiting_reset)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(editor: Editor, i18n: I18n) -> Self {
        Self {
            editor,
            i18n,
            awaiting_reset: false,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn i18n(&self) -> &I18n {
        &self.i18n
    }

    /// Restores the persisted document, returning the feedback line when an
    /// image came back.
    pub async fn restore(&mut self) -> Option<String> {
        if !self.editor.restore().await {
            return None;
        }
        let size = self.editor.canvas_size()?;
        Some(update::say(
            &self.i18n,
            "shell-restored",
            &[("width", &size.width), ("height", &size.height)],
        ))
    }

    /// Handles one input line.
    pub async fn handle_line(&mut self, line: &str) -> Reply {
        if self.awaiting_reset {
            return self.answer_reset(line).await;
        }
        match Message::parse(line) {
            Ok(Some(message)) => update::update(self, message).await,
            Ok(None) => Reply::default(),
            Err(err) => {
                let text = match &err {
                    ParseError::UnknownCommand(command) => {
                        update::say(&self.i18n, err.i18n_key(), &[("command", command)])
                    }
                    ParseError::MissingArgument { command, argument } => update::say(
                        &self.i18n,
                        err.i18n_key(),
                        &[("command", command), ("argument", argument)],
                    ),
                    ParseError::InvalidArgument { command, value } => update::say(
                        &self.i18n,
                        err.i18n_key(),
                        &[("command", command), ("value", value)],
                    ),
                };
                Reply {
                    text: Some(text),
                    quit: false,
                }
            }
        }
    }

    async fn answer_reset(&mut self, line: &str) -> Reply {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Reply::default();
        }
        self.awaiting_reset = false;
        let key = if parse_switch(line) == Some(true) {
            self.editor.reset_all().await;
            "shell-reset-done"
        } else {
            "shell-reset-cancelled"
        };
        Reply {
            text: Some(self.i18n.tr(key)),
            quit: false,
        }
    }
}

/// Feeds every line of `input` to the session until it ends or a command
/// asks to quit.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::error::Error::Io) if reading the input or
/// writing feedback fails.
pub async fn run_lines<R, W>(session: &mut Session, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let reply = session.handle_line(&line).await;
        if let Some(text) = reply.text {
            output.write_all(text.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
        if reply.quit {
            break;
        }
    }
    output.flush().await?;
    Ok(())
}

/// Builds a session from configuration and runs it against the script named
/// in `flags`, or stdin.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::error::Error::Io) if the script cannot be
/// opened or the terminal cannot be written.
pub async fn run(flags: Flags) -> Result<()> {
    paths::init_cli_overrides(paths::CliOverrides {
        data_dir: flags.data_dir.map(PathBuf::from),
        config_dir: flags.config_dir.map(PathBuf::from),
        host_store_dir: flags.host_store.map(PathBuf::from),
    });

    let (config, config_warning) = config::load();
    let i18n = I18n::new(flags.lang, &config);

    let data_dir = paths::get_app_data_dir().unwrap_or_else(|| {
        tracing::warn!("no data directory available, using the working directory");
        PathBuf::from(".")
    });
    let gateway = Gateway::from_dirs(paths::get_host_store_dir(), data_dir);
    let downloads = Downloads::new(paths::get_downloads_dir(config.export.output_dir.clone()));
    tracing::info!(downloads = %downloads.dir().display(), "session starting");

    let editor = Editor::new(config.editor_settings(), gateway, downloads);
    let mut session = Session::new(editor, i18n);
    let mut stdout = tokio::io::stdout();

    let mut banner = Vec::new();
    if let Some(key) = config_warning {
        banner.push(session.i18n().tr(&key));
    }
    if let Some(restored) = session.restore().await {
        banner.push(restored);
    }
    if flags.script.is_none() {
        banner.push(session.i18n().tr("shell-ready"));
    }
    for line in banner {
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }

    match flags.script {
        Some(path) => {
            let file = tokio::fs::File::open(&path).await.inspect_err(|err| {
                tracing::warn!(path = %path.display(), %err, "script could not be opened");
            })?;
            run_lines(&mut session, BufReader::new(file), &mut stdout).await
        }
        None => run_lines(&mut session, BufReader::new(tokio::io::stdin()), &mut stdout).await,
    }
}
