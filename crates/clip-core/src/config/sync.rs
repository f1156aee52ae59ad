//! Active/pending configuration lifecycle and the commit protocol.

use crate::backend::Backend;

use super::normalize::normalize;
use super::writer::ConfigWriter;
use super::{Configuration, FieldEdit};

/// Owns the committed (active) and in-edit (pending) configuration.
///
/// The two copies are separate owned values; a change to one is only
/// visible in the other through [`ConfigSync::commit`] or
/// [`ConfigSync::begin_edit`].
#[derive(Debug)]
pub struct ConfigSync {
    active: Configuration,
    pending: Configuration,
    writer: ConfigWriter,
}

impl ConfigSync {
    pub fn new(active: Configuration, writer: ConfigWriter) -> Self {
        let active = active.normalized();
        Self {
            pending: active.clone(),
            active,
            writer,
        }
    }

    /// Load the stored configuration, falling back to the built-in default.
    pub async fn load<B: Backend>(backend: &B, writer: ConfigWriter) -> Self {
        let active = match backend.load_config().await {
            Ok(raw) => normalize(&raw),
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {e}");
                Configuration::default().normalized()
            }
        };
        tracing::info!(
            theme = %active.theme,
            display_time = active.display_time,
            corner = %active.corner,
            "Config loaded"
        );
        Self::new(active, writer)
    }

    pub fn active(&self) -> &Configuration {
        &self.active
    }

    pub fn pending(&self) -> &Configuration {
        &self.pending
    }

    /// Start an edit session from a fresh copy of the active config.
    pub fn begin_edit(&mut self) {
        self.pending = self.active.clone().normalized();
    }

    /// Apply one field change to the pending config and commit it.
    pub fn mutate_pending(&mut self, edit: FieldEdit) {
        tracing::debug!(?edit, "Settings edit");
        self.pending.apply(edit);
        self.commit();
    }

    /// Normalize pending, copy it into active, and queue persistence.
    ///
    /// A failed save is logged by the writer and never rolls back `active`.
    pub fn commit(&mut self) {
        self.pending = std::mem::take(&mut self.pending).normalized();
        self.active = self.pending.clone();
        self.writer.request(self.active.clone());
    }
}
