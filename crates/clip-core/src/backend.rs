//! Collaborator boundaries: the clipboard/config backend and the file picker.
//!
//! The overlay never talks to storage, the OS clipboard, or a dialog
//! directly. It asks these traits and recovers locally when they fail.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::Value;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::Configuration;
use crate::types::ClipboardKind;
use crate::{BackendError, Result};

/// Request/response operations consumed from the native backend.
pub trait Backend: Send + Sync + 'static {
    /// Stored configuration in raw form. Called once at startup.
    fn load_config(&self) -> impl Future<Output = Result<Value>> + Send;

    /// Persist a committed configuration.
    fn save_config(&self, config: &Configuration) -> impl Future<Output = Result<()>> + Send;

    /// At most one pending clipboard event, e.g. `{"kind": "copy"}`.
    fn poll_clipboard(&self) -> impl Future<Output = Result<Option<Value>>> + Send;

    /// String table for `locale`.
    fn load_locale(&self, locale: &str)
    -> impl Future<Output = Result<HashMap<String, String>>> + Send;

    /// Fire-and-forget termination request.
    fn exit_app(&self);
}

/// File-type filter offered to the picker.
#[derive(Debug, Clone, Copy)]
pub struct ImageFilter {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

impl ImageFilter {
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }
}

pub const IMAGE_FILTER: ImageFilter = ImageFilter {
    name: "Images",
    extensions: &["png", "webp", "gif"],
};

/// Chooses a single image file for a notification kind.
pub trait FilePicker: Send + Sync + 'static {
    fn pick_image(
        &self,
        kind: ClipboardKind,
        filter: ImageFilter,
    ) -> impl Future<Output = Option<PathBuf>> + Send;
}

/// Locale codes to try, most specific first, always ending in `en`.
///
/// `ja-JP` yields `ja_jp`, `ja`, `en`.
pub fn locale_candidates(raw: &str) -> Vec<String> {
    let lowered = raw.trim().to_lowercase();
    let mut parts: Vec<&str> = lowered
        .split(['-', '_'])
        .filter(|part| !part.is_empty())
        .collect();
    let mut result = Vec::new();
    while !parts.is_empty() {
        result.push(parts.join("_"));
        parts.pop();
    }
    if !result.iter().any(|code| code == "en") {
        result.push("en".to_string());
    }
    result
}

/// In-process backend: keeps the stored record in memory and serves
/// clipboard events from a queue.
///
/// Used by the headless shell and as the test double. Each operation can be
/// switched to fail.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    stored: Mutex<Option<Value>>,
    events: Mutex<VecDeque<Value>>,
    locales: HashMap<String, HashMap<String, String>>,
    fail_load: AtomicBool,
    fail_save: AtomicBool,
    fail_poll: AtomicBool,
    save_attempts: AtomicUsize,
    poll_count: AtomicUsize,
    exit: CancellationToken,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the stored record returned by `load_config`.
    pub fn with_stored(self, raw: Value) -> Self {
        Self {
            stored: Mutex::new(Some(raw)),
            ..self
        }
    }

    pub fn with_locale(mut self, code: &str, table: HashMap<String, String>) -> Self {
        self.locales.insert(code.to_lowercase(), table);
        self
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_poll(&self, fail: bool) {
        self.fail_poll.store(fail, Ordering::SeqCst);
    }

    /// Queue a raw clipboard payload for the next poll.
    pub async fn push_event(&self, payload: Value) {
        self.events.lock().await.push_back(payload);
    }

    pub async fn stored(&self) -> Option<Value> {
        self.stored.lock().await.clone()
    }

    /// Number of `save_config` calls, failed ones included.
    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }

    /// Token cancelled once `exit_app` has been requested.
    pub fn exit_token(&self) -> CancellationToken {
        self.exit.clone()
    }
}

impl Backend for MemoryBackend {
    async fn load_config(&self) -> Result<Value> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("config store offline".into()));
        }
        Ok(self
            .stored
            .lock()
            .await
            .clone()
            .unwrap_or_else(|| Value::Object(Default::default())))
    }

    async fn save_config(&self, config: &Configuration) -> Result<()> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(BackendError::Request("config store rejected write".into()));
        }
        let value = serde_json::to_value(config)?;
        *self.stored.lock().await = Some(value);
        Ok(())
    }

    async fn poll_clipboard(&self) -> Result<Option<Value>> {
        self.poll_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_poll.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("clipboard watcher offline".into()));
        }
        Ok(self.events.lock().await.pop_front())
    }

    async fn load_locale(&self, locale: &str) -> Result<HashMap<String, String>> {
        locale_candidates(locale)
            .iter()
            .find_map(|code| self.locales.get(code).cloned())
            .ok_or_else(|| BackendError::LocaleNotFound(locale.to_string()))
    }

    fn exit_app(&self) {
        tracing::info!("Exit requested");
        self.exit.cancel();
    }
}
