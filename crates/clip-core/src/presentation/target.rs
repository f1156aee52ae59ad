//! The rendering capability the core configures but does not own.

use serde::Serialize;

use crate::config::{Corner, Theme};
use crate::types::ClipboardKind;

/// Visibility of a notification surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Hidden,
    Shown,
    /// Hide transition in progress.
    FadingOut,
}

/// A custom image resolved to something a renderer can load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Path as configured by the user.
    pub path: String,
    /// Displayable resource reference (`file://` URL or the raw path).
    pub uri: String,
}

/// Anything that can display a notification: a webview element, a native
/// widget, a terminal line.
pub trait VisualTarget {
    fn apply_theme(&mut self, theme: Theme);
    fn apply_corner(&mut self, corner: Corner);
    fn set_visibility(&mut self, visibility: Visibility);
    /// Built-in icon for `kind`, or `None` to hide it.
    fn set_icon(&mut self, icon: Option<ClipboardKind>);
    fn set_image(&mut self, image: Option<&ImageRef>);
    fn set_message(&mut self, message: Option<&str>);
}

/// Plain record of the last applied visual state.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VisualState {
    pub theme: Theme,
    pub corner: Corner,
    pub visibility: Visibility,
    pub icon: Option<ClipboardKind>,
    pub image: Option<ImageRef>,
    pub message: Option<String>,
}

impl VisualState {
    /// Whether any content (icon, image, or message) is displayed.
    pub fn has_content(&self) -> bool {
        self.icon.is_some() || self.image.is_some() || self.message.is_some()
    }
}

impl VisualTarget for VisualState {
    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    fn apply_corner(&mut self, corner: Corner) {
        self.corner = corner;
    }

    fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    fn set_icon(&mut self, icon: Option<ClipboardKind>) {
        self.icon = icon;
    }

    fn set_image(&mut self, image: Option<&ImageRef>) {
        self.image = image.cloned();
    }

    fn set_message(&mut self, message: Option<&str>) {
        self.message = message.map(str::to_string);
    }
}
