//! Line-oriented command language read from stdin.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use clip_core::runtime::OverlayClosed;
use clip_core::{ClipboardKind, Corner, FieldEdit, MemoryBackend, OverlayCommand, OverlayHandle};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Queue a clipboard event on the backend.
    Clipboard(ClipboardKind),
    Hover,
    Leave,
    OpenSettings,
    CloseSettings,
    Edit(FieldEdit),
    Pick(ClipboardKind),
    /// Set an image directly, bypassing the picker.
    Image { kind: ClipboardKind, path: PathBuf },
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  copy | clear               simulate a clipboard event
  hover | leave              pointer enters / leaves the notification
  settings | close           open / close the settings panel
  theme <dark|light|custom>  set the theme
  time <seconds>             set the display time (1-60)
  corner <bottom_right|bottom_left|top_right|top_left>
  image <copy|clear> <path>  set a custom image
  unset <copy|clear>         remove a custom image
  pick <copy|clear>          choose a custom image from the image directory
  status                     print the current state
  quit                       exit";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "copy" => ConsoleCommand::Clipboard(ClipboardKind::Copy),
        "clear" => ConsoleCommand::Clipboard(ClipboardKind::Clear),
        "hover" | "enter" => ConsoleCommand::Hover,
        "leave" => ConsoleCommand::Leave,
        "settings" => ConsoleCommand::OpenSettings,
        "close" => ConsoleCommand::CloseSettings,
        "theme" => ConsoleCommand::Edit(FieldEdit::Theme(field("theme", rest)?)),
        "time" => {
            let secs: u32 = field("time", rest)?;
            ConsoleCommand::Edit(FieldEdit::DisplayTime(secs))
        }
        "corner" => ConsoleCommand::Edit(FieldEdit::Corner(field::<Corner>("corner", rest)?)),
        "image" => {
            let (kind, path) = rest
                .split_once(char::is_whitespace)
                .ok_or(CommandError::MissingArgument("image"))?;
            let path = path.trim();
            if path.is_empty() {
                return Err(CommandError::MissingArgument("image"));
            }
            ConsoleCommand::Image {
                kind: field("kind", kind)?,
                path: PathBuf::from(path),
            }
        }
        "unset" => ConsoleCommand::Edit(FieldEdit::CustomImage {
            kind: field("kind", rest)?,
            path: None,
        }),
        "pick" => ConsoleCommand::Pick(field("kind", rest)?),
        "status" => ConsoleCommand::Status,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(cmd))
}

fn field<T>(name: &'static str, value: &str) -> Result<T, CommandError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if value.is_empty() {
        return Err(CommandError::MissingArgument(name));
    }
    value.parse().map_err(|e: T::Err| CommandError::Invalid {
        field: name,
        reason: e.to_string(),
    })
}

/// Read commands until end of input, `quit`, or the overlay stops.
pub async fn run_console<R>(input: R, backend: Arc<MemoryBackend>, overlay: OverlayHandle)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!("Console input closed");
                return;
            }
            Err(e) => {
                tracing::warn!("Console read failed: {e}");
                return;
            }
        };

        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        let quit = cmd == ConsoleCommand::Quit;
        if dispatch(cmd, &backend, &overlay).await.is_err() {
            tracing::info!("Overlay stopped, console detached");
            return;
        }
        if quit {
            return;
        }
    }
}

async fn dispatch(
    cmd: ConsoleCommand,
    backend: &MemoryBackend,
    overlay: &OverlayHandle,
) -> Result<(), OverlayClosed> {
    let command = match cmd {
        ConsoleCommand::Clipboard(kind) => {
            backend.push_event(json!({ "kind": kind })).await;
            return Ok(());
        }
        ConsoleCommand::Status => {
            let snapshot = overlay.snapshot().await?;
            match serde_json::to_string_pretty(&snapshot) {
                Ok(text) => println!("{text}"),
                Err(e) => tracing::warn!("Failed to format status: {e}"),
            }
            return Ok(());
        }
        ConsoleCommand::Help => {
            println!("{HELP}");
            return Ok(());
        }
        ConsoleCommand::Hover => OverlayCommand::PointerEntered,
        ConsoleCommand::Leave => OverlayCommand::PointerLeft,
        ConsoleCommand::OpenSettings => OverlayCommand::OpenSettings,
        ConsoleCommand::CloseSettings => OverlayCommand::CloseSettings,
        ConsoleCommand::Edit(edit) => OverlayCommand::Edit(edit),
        ConsoleCommand::Pick(kind) => OverlayCommand::PickImage(kind),
        ConsoleCommand::Image { kind, path } => OverlayCommand::ImagePicked { kind, path },
        ConsoleCommand::Quit => OverlayCommand::Quit,
    };
    overlay.send(command).await
}
