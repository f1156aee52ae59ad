//! User configuration: types, normalization, and active/pending sync.

pub mod normalize;
pub mod sync;
pub mod writer;

pub use normalize::normalize;
pub use sync::ConfigSync;
pub use writer::ConfigWriter;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::ClipboardKind;

pub const DEFAULT_DISPLAY_TIME_SECS: u32 = 3;
pub const MIN_DISPLAY_TIME_SECS: u32 = 1;
pub const MAX_DISPLAY_TIME_SECS: u32 = 60;

/// Color scheme of the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Custom,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            "custom" => Ok(Self::Custom),
            other => Err(format!("must be dark, light, or custom (got '{other}')")),
        }
    }
}

/// Screen corner the notification is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl Corner {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BottomRight => "bottom_right",
            Self::BottomLeft => "bottom_left",
            Self::TopRight => "top_right",
            Self::TopLeft => "top_left",
        }
    }

    /// Visual class name, e.g. `corner-bottom-right`.
    pub fn class_name(self) -> String {
        format!("corner-{}", self.as_str().replace('_', "-"))
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Corner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bottom_right" => Ok(Self::BottomRight),
            "bottom_left" => Ok(Self::BottomLeft),
            "top_right" => Ok(Self::TopRight),
            "top_left" => Ok(Self::TopLeft),
            other => Err(format!(
                "must be bottom_right, bottom_left, top_right, or top_left (got '{other}')"
            )),
        }
    }
}

/// Optional image per clipboard kind. An empty path means "not set".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomImages {
    pub copy: String,
    pub clear: String,
}

impl CustomImages {
    /// The configured path for `kind`, or `None` when unset.
    pub fn get(&self, kind: ClipboardKind) -> Option<&str> {
        let path = match kind {
            ClipboardKind::Copy => &self.copy,
            ClipboardKind::Clear => &self.clear,
        };
        (!path.is_empty()).then_some(path.as_str())
    }

    pub fn set(&mut self, kind: ClipboardKind, path: String) {
        match kind {
            ClipboardKind::Copy => self.copy = path,
            ClipboardKind::Clear => self.clear = path,
        }
    }
}

/// The unit of persistence and of UI binding.
///
/// Only ever handed out in normalized form; build one from raw input with
/// [`normalize`]. Unknown fields from the stored record are kept in `extra`
/// and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    pub theme: Theme,
    pub display_time: u32,
    pub corner: Corner,
    pub custom_images: CustomImages,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            display_time: DEFAULT_DISPLAY_TIME_SECS,
            corner: Corner::BottomRight,
            custom_images: CustomImages::default(),
            extra: Map::new(),
        }
    }
}

impl Configuration {
    /// Re-apply the invariants to an already typed configuration.
    pub fn normalized(mut self) -> Self {
        self.display_time = normalize::clamp_display_time(self.display_time.into());
        self
    }

    pub fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::Theme(theme) => self.theme = theme,
            FieldEdit::DisplayTime(secs) => self.display_time = secs,
            FieldEdit::Corner(corner) => self.corner = corner,
            FieldEdit::CustomImage { kind, path } => {
                self.custom_images.set(kind, path.unwrap_or_default())
            }
        }
    }
}

/// A single field change made in the settings panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Theme(Theme),
    DisplayTime(u32),
    Corner(Corner),
    /// `None` clears the image for `kind`.
    CustomImage {
        kind: ClipboardKind,
        path: Option<String>,
    },
}
