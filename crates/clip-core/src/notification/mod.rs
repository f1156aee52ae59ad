//! Notification lifecycle: show, auto-hide, hover suspension, fade out.
//!
//! Last event wins: a new clipboard event replaces whatever is on screen
//! and restarts the timers.

pub mod controller;
pub mod session;

pub use controller::NotificationController;
pub use session::{
    FADE_OUT, NotificationSession, Phase, ScheduledTask, SessionId, TaskKey, TaskPurpose,
};
