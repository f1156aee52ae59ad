//! Config writer: persists committed configurations in the background.
//!
//! Commits never wait for storage. Only the latest committed snapshot is
//! kept; while a save is in flight, further commits replace each other and
//! the newest one is written next. At most one save runs at a time.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::backend::Backend;
use crate::config::Configuration;

/// Sending half of the persistence slot.
#[derive(Debug)]
pub struct ConfigWriter {
    tx: watch::Sender<Option<Configuration>>,
}

impl ConfigWriter {
    /// Start the writer loop against `backend`.
    ///
    /// The loop ends once the `ConfigWriter` is dropped and the last
    /// snapshot has been written.
    pub fn spawn<B: Backend>(backend: Arc<B>) -> (Self, JoinHandle<()>) {
        let (writer, rx) = Self::channel();
        let handle = tokio::spawn(writer_loop(backend, rx));
        tracing::info!("Config writer started");
        (writer, handle)
    }

    /// A writer whose requests land in the returned receiver.
    pub fn channel() -> (Self, watch::Receiver<Option<Configuration>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }

    /// Queue `config` for persistence, replacing any unwritten snapshot.
    pub fn request(&self, config: Configuration) {
        if self.tx.is_closed() {
            tracing::error!("Config writer stopped, edit will not be persisted");
            return;
        }
        self.tx.send_replace(Some(config));
    }
}

async fn writer_loop<B: Backend>(backend: Arc<B>, mut rx: watch::Receiver<Option<Configuration>>) {
    // An unseen snapshot is still returned after the sender is dropped.
    while rx.changed().await.is_ok() {
        let Some(config) = rx.borrow_and_update().clone() else {
            continue;
        };
        match backend.save_config(&config).await {
            Ok(()) => tracing::debug!(
                theme = %config.theme,
                display_time = config.display_time,
                corner = %config.corner,
                "Config saved"
            ),
            Err(e) => tracing::error!("Failed to save config: {e}"),
        }
    }

    tracing::info!("Config writer stopped");
}
