use std::time::Duration;

use clip_core::EventPoller;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const OVERLAY_STOP_TIMEOUT: Duration = Duration::from_secs(1);
const SAVE_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Tasks stopped by [`graceful_shutdown`].
pub struct ShutdownParts {
    pub token: CancellationToken,
    pub poller: EventPoller,
    pub overlay: JoinHandle<()>,
    pub writer: JoinHandle<()>,
}

pub async fn graceful_shutdown(parts: ShutdownParts) {
    let ShutdownParts {
        token,
        mut poller,
        overlay,
        writer,
    } = parts;

    tracing::info!("Shutdown sequence started");

    token.cancel();
    if poller.is_running() {
        poller.shutdown().await;
        tracing::info!("Shutdown: clipboard polling stopped");
    }

    if join_within(overlay, OVERLAY_STOP_TIMEOUT, "overlay").await {
        tracing::info!("Shutdown: overlay stopped");
    }

    // The writer drains once the overlay has dropped its sender.
    if join_within(writer, SAVE_DRAIN_TIMEOUT, "config writer").await {
        tracing::info!("Shutdown: pending config saves written");
    } else {
        tracing::warn!("Shutdown: pending config saves abandoned");
    }

    tracing::info!("Shutdown sequence completed");
}

/// Wait for `task` up to `limit`, aborting it on expiry.
async fn join_within(mut task: JoinHandle<()>, limit: Duration, name: &str) -> bool {
    match timeout(limit, &mut task).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!("Shutdown: {name} task failed: {e}");
            false
        }
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "Shutdown: {name} did not stop in time");
            task.abort();
            false
        }
    }
}
