//! Visual target that reports state changes as text lines.

use std::io::{self, Write};

use clip_core::presentation::{ImageRef, Visibility};
use clip_core::{ClipboardKind, Corner, Theme, VisualState, VisualTarget};

/// Prints one line per changed field, prefixed with a surface label.
pub struct TerminalTarget<W: Write = io::Stdout> {
    label: &'static str,
    state: VisualState,
    out: W,
}

impl TerminalTarget {
    pub fn stdout(label: &'static str) -> Self {
        Self::new(label, io::stdout())
    }
}

impl<W: Write> TerminalTarget<W> {
    pub fn new(label: &'static str, out: W) -> Self {
        Self {
            label,
            state: VisualState::default(),
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "[{}] {}", self.label, line) {
            tracing::debug!("Terminal write failed: {e}");
        }
    }
}

fn icon_glyph(kind: ClipboardKind) -> &'static str {
    match kind {
        ClipboardKind::Copy => "📋",
        ClipboardKind::Clear => "🧹",
    }
}

impl<W: Write> VisualTarget for TerminalTarget<W> {
    fn apply_theme(&mut self, theme: Theme) {
        if self.state.theme != theme {
            self.state.theme = theme;
            self.emit(format_args!("theme {theme}"));
        }
    }

    fn apply_corner(&mut self, corner: Corner) {
        if self.state.corner != corner {
            self.state.corner = corner;
            self.emit(format_args!("corner {}", corner.class_name()));
        }
    }

    fn set_visibility(&mut self, visibility: Visibility) {
        // Every show is reported, so a restarted notification is visible too.
        if self.state.visibility == visibility && visibility != Visibility::Shown {
            return;
        }
        self.state.visibility = visibility;
        match visibility {
            Visibility::Shown if !self.state.has_content() => self.emit(format_args!("show (empty)")),
            Visibility::Shown => {
                let icon = self.state.icon.map(icon_glyph).unwrap_or("");
                let body = match (&self.state.image, &self.state.message) {
                    (Some(image), _) => image.uri.clone(),
                    (None, Some(message)) => message.clone(),
                    (None, None) => String::new(),
                };
                self.emit(format_args!("show {icon} {body}"));
            }
            Visibility::FadingOut => self.emit(format_args!("fading")),
            Visibility::Hidden => self.emit(format_args!("hidden")),
        }
    }

    fn set_icon(&mut self, icon: Option<ClipboardKind>) {
        self.state.icon = icon;
    }

    fn set_image(&mut self, image: Option<&ImageRef>) {
        if self.state.image.as_ref() != image {
            self.state.image = image.cloned();
            if let Some(image) = image {
                self.emit(format_args!("image {}", image.uri));
            }
        }
    }

    fn set_message(&mut self, message: Option<&str>) {
        if self.state.message.as_deref() != message {
            self.state.message = message.map(str::to_string);
            if let Some(message) = message {
                self.emit(format_args!("message {message}"));
            }
        }
    }
}
