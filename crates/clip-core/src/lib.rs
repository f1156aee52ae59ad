//! Presentation core of the Clip Pop clipboard overlay.
//!
//! Drives a transient notification when the clipboard backend reports a
//! copy or clear, and keeps the persisted (active) and in-edit (pending)
//! copies of the user configuration in sync.

pub mod backend;
pub mod config;
pub mod notification;
pub mod poller;
pub mod presentation;
pub mod runtime;
pub mod types;

// Re-exports for convenience
pub use backend::{Backend, FilePicker, MemoryBackend};
pub use config::{ConfigSync, Configuration, Corner, FieldEdit, Theme, normalize};
pub use notification::{NotificationController, Phase};
pub use poller::EventPoller;
pub use presentation::{Messages, PresentationBinder, VisualState, VisualTarget};
pub use runtime::{Overlay, OverlayCommand, OverlayHandle};
pub use types::ClipboardKind;

/// Errors reported by the backend collaborator.
///
/// None of these are fatal to the overlay: every caller recovers locally
/// and logs the failure.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend request failed: {0}")]
    Request(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Locale not found: {0}")]
    LocaleNotFound(String),
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
