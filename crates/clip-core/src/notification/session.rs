//! Notification session state and scheduled tasks.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::types::ClipboardKind;

/// Length of the hide transition. Not tied to the configured display time.
pub const FADE_OUT: Duration = Duration::from_millis(420);

/// Identity of one displayed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub(crate) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Showing,
    HoverLocked,
    HidingOut,
}

/// Per-display state, alive from a show until the fade completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSession {
    pub id: SessionId,
    pub kind: ClipboardKind,
    pub visible: bool,
    pub hover_locked: bool,
    pub pending_hide_at: Option<Instant>,
}

impl NotificationSession {
    pub(crate) fn new(id: SessionId, kind: ClipboardKind) -> Self {
        Self {
            id,
            kind,
            visible: true,
            hover_locked: false,
            pending_hide_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if !self.visible {
            Phase::HidingOut
        } else if self.hover_locked {
            Phase::HoverLocked
        } else {
            Phase::Showing
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPurpose {
    /// Display time elapsed; start the hide transition.
    Hide,
    /// Hide transition finished; return to idle.
    FadeOut,
}

/// Key of a scheduled task. A task whose key no longer matches the armed
/// one was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskKey {
    pub session: SessionId,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub key: TaskKey,
    pub purpose: TaskPurpose,
    pub deadline: Instant,
}
