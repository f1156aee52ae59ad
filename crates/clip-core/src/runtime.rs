//! Overlay runtime: the single task that owns all presentation state.
//!
//! Poll results, pointer events, settings edits and timer expiries are all
//! delivered here and handled one at a time, so no state is shared or locked.

use std::future::pending;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::backend::{Backend, FilePicker, IMAGE_FILTER};
use crate::config::{ConfigSync, ConfigWriter, Configuration, FieldEdit};
use crate::notification::{NotificationController, Phase};
use crate::presentation::{Messages, PresentationBinder, VisualTarget};
use crate::types::ClipboardKind;

const COMMAND_CAPACITY: usize = 100;

/// Inputs accepted by the overlay runtime.
#[derive(Debug)]
pub enum OverlayCommand {
    /// A clipboard event reported by the backend.
    Clipboard(ClipboardKind),
    PointerEntered,
    PointerLeft,
    OpenSettings,
    CloseSettings,
    Edit(FieldEdit),
    /// Ask the file picker for an image; the result arrives as `ImagePicked`.
    PickImage(ClipboardKind),
    ImagePicked { kind: ClipboardKind, path: PathBuf },
    Snapshot(oneshot::Sender<OverlaySnapshot>),
    /// Request application exit and stop the runtime.
    Quit,
}

/// Point-in-time view of the runtime state.
#[derive(Debug, Clone, Serialize)]
pub struct OverlaySnapshot {
    pub phase: Phase,
    pub active: Configuration,
    pub pending: Configuration,
    pub settings_open: bool,
}

/// The runtime has stopped and no longer accepts commands.
#[derive(Debug, thiserror::Error)]
#[error("Overlay runtime stopped")]
pub struct OverlayClosed;

/// Cloneable sender for [`OverlayCommand`]s.
#[derive(Debug, Clone)]
pub struct OverlayHandle {
    tx: mpsc::Sender<OverlayCommand>,
}

impl OverlayHandle {
    pub fn new(tx: mpsc::Sender<OverlayCommand>) -> Self {
        Self { tx }
    }

    pub async fn send(&self, command: OverlayCommand) -> Result<(), OverlayClosed> {
        self.tx.send(command).await.map_err(|_| OverlayClosed)
    }

    pub async fn clipboard(&self, kind: ClipboardKind) -> Result<(), OverlayClosed> {
        self.send(OverlayCommand::Clipboard(kind)).await
    }

    pub async fn snapshot(&self) -> Result<OverlaySnapshot, OverlayClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(OverlayCommand::Snapshot(reply)).await?;
        rx.await.map_err(|_| OverlayClosed)
    }
}

enum Wake {
    Shutdown,
    Command(Option<OverlayCommand>),
    Timer,
}

/// Owns configuration sync, the notification controller and the settings
/// preview.
pub struct Overlay<B, P, T, V> {
    backend: Arc<B>,
    picker: Arc<P>,
    config: ConfigSync,
    binder: PresentationBinder,
    controller: NotificationController<T>,
    preview: V,
    settings_open: bool,
    rx: mpsc::Receiver<OverlayCommand>,
    handle: OverlayHandle,
    shutdown: CancellationToken,
}

impl<B, P, T, V> Overlay<B, P, T, V>
where
    B: Backend,
    P: FilePicker,
    T: VisualTarget + Send + 'static,
    V: VisualTarget + Send + 'static,
{
    pub fn new(
        backend: Arc<B>,
        picker: Arc<P>,
        config: ConfigSync,
        binder: PresentationBinder,
        live: T,
        preview: V,
        shutdown: CancellationToken,
    ) -> (Self, OverlayHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let handle = OverlayHandle::new(tx);
        let overlay = Self {
            backend,
            picker,
            config,
            controller: NotificationController::new(live, binder.clone()),
            binder,
            preview,
            settings_open: false,
            rx,
            handle: handle.clone(),
            shutdown,
        };
        (overlay, handle)
    }

    /// Process commands and timers until shutdown or `Quit`.
    pub async fn run(mut self) {
        tracing::info!("Overlay runtime started");
        self.render_preview();

        loop {
            let deadline = self.controller.next_deadline();
            let wake = tokio::select! {
                _ = self.shutdown.cancelled() => Wake::Shutdown,
                cmd = self.rx.recv() => Wake::Command(cmd),
                _ = sleep_until_deadline(deadline) => Wake::Timer,
            };

            match wake {
                Wake::Shutdown | Wake::Command(None) => break,
                Wake::Command(Some(OverlayCommand::Quit)) => {
                    self.backend.exit_app();
                    break;
                }
                Wake::Command(Some(cmd)) => self.handle_command(cmd),
                Wake::Timer => {
                    self.controller.fire_due(Instant::now());
                }
            }
        }

        tracing::info!("Overlay runtime stopped");
    }

    fn handle_command(&mut self, cmd: OverlayCommand) {
        match cmd {
            OverlayCommand::Clipboard(kind) => {
                self.controller
                    .notify(kind, self.config.active(), Instant::now());
            }
            OverlayCommand::PointerEntered => self.controller.pointer_entered(),
            OverlayCommand::PointerLeft => {
                self.controller
                    .pointer_left(self.config.active(), Instant::now());
            }
            OverlayCommand::OpenSettings => {
                self.config.begin_edit();
                self.settings_open = true;
                self.render_preview();
            }
            OverlayCommand::CloseSettings => self.settings_open = false,
            OverlayCommand::Edit(edit) => self.apply_edit(edit),
            OverlayCommand::PickImage(kind) => self.spawn_picker(kind),
            OverlayCommand::ImagePicked { kind, path } => {
                if !IMAGE_FILTER.accepts(&path) {
                    tracing::warn!(path = %path.display(), "Ignoring unsupported image type");
                    return;
                }
                let Some(path) = path.to_str() else {
                    tracing::warn!(path = %path.display(), "Ignoring image path that is not valid UTF-8");
                    return;
                };
                self.apply_edit(FieldEdit::CustomImage {
                    kind,
                    path: Some(path.to_string()),
                });
            }
            OverlayCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            OverlayCommand::Quit => {}
        }
    }

    fn apply_edit(&mut self, edit: FieldEdit) {
        self.config.mutate_pending(edit);
        self.render_preview();
    }

    fn render_preview(&mut self) {
        self.binder
            .render(&mut self.preview, self.config.pending(), ClipboardKind::Copy);
    }

    fn spawn_picker(&self, kind: ClipboardKind) {
        let picker = self.picker.clone();
        let handle = self.handle.clone();
        tokio::spawn(async move {
            let Some(path) = picker.pick_image(kind, IMAGE_FILTER).await else {
                tracing::debug!(%kind, "Image selection cancelled");
                return;
            };
            if handle
                .send(OverlayCommand::ImagePicked { kind, path })
                .await
                .is_err()
            {
                tracing::debug!("Overlay stopped before image selection arrived");
            }
        });
    }

    fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            phase: self.controller.phase(),
            active: self.config.active().clone(),
            pending: self.config.pending().clone(),
            settings_open: self.settings_open,
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

/// A runtime ready to run, plus the task persisting its edits.
pub struct Hydrated<B, P, T, V> {
    pub overlay: Overlay<B, P, T, V>,
    pub handle: OverlayHandle,
    /// Finishes after the overlay is dropped and pending saves are written.
    pub writer: JoinHandle<()>,
}

/// Startup sequence: string table, stored configuration, writer, runtime.
///
/// Backend failures fall back to built-in defaults and never abort startup.
pub async fn hydrate<B, P, T, V>(
    backend: Arc<B>,
    picker: Arc<P>,
    locale: &str,
    live: T,
    preview: V,
    shutdown: CancellationToken,
) -> Hydrated<B, P, T, V>
where
    B: Backend,
    P: FilePicker,
    T: VisualTarget + Send + 'static,
    V: VisualTarget + Send + 'static,
{
    let messages = match backend.load_locale(locale).await {
        Ok(table) => {
            tracing::info!(locale, entries = table.len(), "Locale loaded");
            Messages::new(table)
        }
        Err(e) => {
            tracing::warn!("Locale fallback: {e}");
            Messages::default()
        }
    };
    if messages.is_empty() {
        tracing::debug!("String table empty, using built-in English text");
    }

    let (writer, writer_task) = ConfigWriter::spawn(backend.clone());
    let config = ConfigSync::load(&*backend, writer).await;
    let binder = PresentationBinder::new(Arc::new(messages));

    let (overlay, handle) = Overlay::new(backend, picker, config, binder, live, preview, shutdown);
    Hydrated {
        overlay,
        handle,
        writer: writer_task,
    }
}
