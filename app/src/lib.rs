pub mod console;
pub mod locale;
pub mod picker;
pub mod settings;
pub mod shutdown;
pub mod terminal;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use clip_core::runtime::hydrate;
use clip_core::{EventPoller, MemoryBackend, OverlayHandle};

use picker::DirectoryPicker;
use settings::AppSettings;
use shutdown::ShutdownParts;
use terminal::TerminalTarget;

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// In-memory backend with the built-in string tables and optional seed.
pub fn build_backend(settings: &AppSettings) -> MemoryBackend {
    let mut backend = MemoryBackend::new();
    for (code, table) in locale::builtin() {
        backend = backend.with_locale(code, table);
    }
    if let Some(seed) = &settings.initial_config {
        backend = backend.with_stored(seed.clone());
    }
    backend
}

/// A started overlay with its polling loop and background tasks.
pub struct App {
    pub backend: Arc<MemoryBackend>,
    pub handle: OverlayHandle,
    token: CancellationToken,
    poller: EventPoller,
    overlay: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl App {
    /// Hydrate the overlay and start polling.
    pub async fn start(settings: &AppSettings) -> Self {
        let backend = Arc::new(build_backend(settings));
        let picker = Arc::new(DirectoryPicker::new(settings.image_dir.clone()));
        let token = CancellationToken::new();

        let hydrated = hydrate(
            backend.clone(),
            picker,
            &settings.locale,
            TerminalTarget::stdout("notify"),
            TerminalTarget::stdout("preview"),
            token.clone(),
        )
        .await;

        let mut poller = EventPoller::new(token.clone()).with_interval(settings.poll_interval);
        poller.start(backend.clone(), hydrated.handle.clone());
        let overlay = tokio::spawn(hydrated.overlay.run());

        Self {
            backend,
            handle: hydrated.handle,
            token,
            poller,
            overlay,
            writer: hydrated.writer,
        }
    }

    /// Resolves once the overlay requested application exit.
    pub async fn exit_requested(&self) {
        self.backend.exit_token().cancelled().await;
    }

    pub async fn shutdown(self) {
        shutdown::graceful_shutdown(ShutdownParts {
            token: self.token,
            poller: self.poller,
            overlay: self.overlay,
            writer: self.writer,
        })
        .await;
    }
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let settings = AppSettings::load()?;
    tracing::info!(
        locale = %settings.locale,
        poll_ms = settings.poll_interval.as_millis() as u64,
        image_dir = %settings.image_dir.display(),
        "Starting Clip Pop (console mode)"
    );

    let app = App::start(&settings).await;
    let console = tokio::spawn(console::run_console(
        tokio::io::BufReader::new(tokio::io::stdin()),
        app.backend.clone(),
        app.handle.clone(),
    ));
    println!("{}", console::HELP);

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Interrupted");
        }
        _ = app.exit_requested() => tracing::info!("Exit requested by overlay"),
    }

    console.abort();
    app.shutdown().await;
    Ok(())
}
