//! Shared event types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of clipboard activity reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardKind {
    Copy,
    Clear,
}

impl ClipboardKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Clear => "clear",
        }
    }

    /// Locale key and English fallback for the notification text.
    pub fn message_key(self) -> (&'static str, &'static str) {
        match self {
            Self::Copy => ("copied", "Copied!"),
            Self::Clear => ("cleared", "Cleared"),
        }
    }
}

impl fmt::Display for ClipboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClipboardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "copy" => Ok(Self::Copy),
            "clear" => Ok(Self::Clear),
            other => Err(format!("unknown clipboard kind: {other}")),
        }
    }
}
