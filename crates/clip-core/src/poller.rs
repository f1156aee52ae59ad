//! Periodic clipboard event polling.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::backend::Backend;
use crate::runtime::OverlayHandle;
use crate::types::ClipboardKind;

/// Default polling cadence.
pub const POLL_INTERVAL: Duration = Duration::from_millis(900);

/// Owns at most one polling loop.
///
/// Each loop runs under a child of the shutdown token, so stopping the
/// poller or shutting down the application both end it.
#[derive(Debug)]
pub struct EventPoller {
    interval: Duration,
    parent: CancellationToken,
    running: Option<(CancellationToken, JoinHandle<()>)>,
}

impl EventPoller {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            interval: POLL_INTERVAL,
            parent: shutdown,
            running: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|(_, task)| !task.is_finished())
    }

    /// Start polling, replacing any loop already running.
    pub fn start<B: Backend>(&mut self, backend: Arc<B>, overlay: OverlayHandle) {
        self.stop();
        let token = self.parent.child_token();
        let task = tokio::spawn(poll_loop(backend, overlay, self.interval, token.clone()));
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Clipboard polling started");
        self.running = Some((token, task));
    }

    /// Cancel the running loop without waiting for it.
    pub fn stop(&mut self) {
        if let Some((token, _)) = self.running.take() {
            token.cancel();
        }
    }

    /// Cancel the running loop and wait for it to finish.
    pub async fn shutdown(&mut self) {
        if let Some((token, task)) = self.running.take() {
            token.cancel();
            if let Err(e) = task.await {
                tracing::warn!("Polling task ended abnormally: {e}");
            }
        }
    }
}

impl Drop for EventPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop<B: Backend>(
    backend: Arc<B>,
    overlay: OverlayHandle,
    period: Duration,
    token: CancellationToken,
) {
    // Ticks are measured from the start of each poll, so a slow backend
    // does not stretch the cadence. The first tick fires immediately.
    let mut ticker = interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            _ = token.cancelled() => break,
            result = backend.poll_clipboard() => result,
        };

        match result {
            Ok(Some(payload)) => {
                if let Some(kind) = parse_event(&payload) {
                    tracing::debug!(%kind, "Clipboard event");
                    if overlay.clipboard(kind).await.is_err() {
                        tracing::info!("Overlay closed, polling stopped");
                        return;
                    }
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Clipboard poll failed: {e}"),
        }
    }
    tracing::info!("Clipboard polling stopped");
}

/// Extract the event kind from a poll payload.
///
/// Anything other than `{"kind": "copy" | "clear"}` is treated as no event.
pub fn parse_event(payload: &Value) -> Option<ClipboardKind> {
    payload.get("kind")?.as_str()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;
    use tokio::sync::{Mutex, mpsc};
    use tokio::time::{Instant, sleep};

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::runtime::OverlayCommand;

    fn overlay() -> (OverlayHandle, mpsc::Receiver<OverlayCommand>) {
        let (tx, rx) = mpsc::channel(16);
        (OverlayHandle::new(tx), rx)
    }

    fn received(rx: &mut mpsc::Receiver<OverlayCommand>) -> Vec<ClipboardKind> {
        let mut kinds = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            if let OverlayCommand::Clipboard(kind) = cmd {
                kinds.push(kind);
            }
        }
        kinds
    }

    #[test]
    fn test_parse_event() {
        assert_eq!(parse_event(&json!({"kind": "copy"})), Some(ClipboardKind::Copy));
        assert_eq!(parse_event(&json!({"kind": "clear"})), Some(ClipboardKind::Clear));
        assert_eq!(parse_event(&json!({"kind": "none"})), None);
        assert_eq!(parse_event(&json!({"kind": 1})), None);
        assert_eq!(parse_event(&json!({"type": "copy"})), None);
        assert_eq!(parse_event(&json!("copy")), None);
        assert_eq!(parse_event(&Value::Null), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_then_on_interval() {
        let backend = Arc::new(MemoryBackend::new());
        let (handle, _rx) = overlay();
        let mut poller = EventPoller::new(CancellationToken::new());

        poller.start(backend.clone(), handle);
        sleep(Duration::from_millis(1)).await;
        assert_eq!(backend.poll_count(), 1);

        sleep(Duration::from_millis(900)).await;
        assert_eq!(backend.poll_count(), 2);

        sleep(Duration::from_millis(8000)).await;
        assert_eq!(backend.poll_count(), 10);
        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_forwards_events_and_skips_malformed() {
        let backend = Arc::new(MemoryBackend::new());
        backend.push_event(json!({"kind": "copy"})).await;
        backend.push_event(json!({"kind": "bogus"})).await;
        backend.push_event(json!({"kind": "none"})).await;
        backend.push_event(json!({"kind": "clear"})).await;
        let (handle, mut rx) = overlay();
        let mut poller = EventPoller::new(CancellationToken::new());

        poller.start(backend.clone(), handle);
        sleep(Duration::from_millis(3000)).await;
        poller.shutdown().await;

        assert_eq!(received(&mut rx), vec![ClipboardKind::Copy, ClipboardKind::Clear]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_failure_keeps_polling() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_fail_poll(true);
        let (handle, mut rx) = overlay();
        let mut poller = EventPoller::new(CancellationToken::new());

        poller.start(backend.clone(), handle);
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(backend.poll_count(), 2);

        backend.set_fail_poll(false);
        backend.push_event(json!({"kind": "copy"})).await;
        sleep(Duration::from_millis(900)).await;
        assert_eq!(received(&mut rx), vec![ClipboardKind::Copy]);
        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_loop() {
        let backend = Arc::new(MemoryBackend::new());
        let (handle, _rx) = overlay();
        let mut poller = EventPoller::new(CancellationToken::new());

        poller.start(backend.clone(), handle.clone());
        sleep(Duration::from_millis(450)).await;
        poller.start(backend.clone(), handle);
        sleep(Duration::from_millis(1)).await;
        assert_eq!(backend.poll_count(), 2);

        // One loop: polls at +0, +900, ..., +8100 after the restart.
        sleep(Duration::from_millis(8950)).await;
        assert_eq!(backend.poll_count(), 11);
        poller.shutdown().await;
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_cancel_stops_loop() {
        let backend = Arc::new(MemoryBackend::new());
        let (handle, _rx) = overlay();
        let shutdown = CancellationToken::new();
        let mut poller = EventPoller::new(shutdown.clone()).with_interval(Duration::from_millis(100));

        poller.start(backend.clone(), handle);
        sleep(Duration::from_millis(250)).await;
        shutdown.cancel();
        sleep(Duration::from_millis(1)).await;
        let count = backend.poll_count();
        assert!(!poller.is_running());

        sleep(Duration::from_secs(5)).await;
        assert_eq!(backend.poll_count(), count);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_overlay_stops_loop() {
        let backend = Arc::new(MemoryBackend::new());
        backend.push_event(json!({"kind": "copy"})).await;
        let (handle, rx) = overlay();
        drop(rx);
        let mut poller = EventPoller::new(CancellationToken::new());

        poller.start(backend.clone(), handle);
        sleep(Duration::from_millis(1)).await;
        assert!(!poller.is_running());
        assert_eq!(backend.poll_count(), 1);
    }

    /// Backend whose polls take 300 ms; records when each poll started.
    #[derive(Default)]
    struct SlowPoll {
        started: Mutex<Vec<Instant>>,
    }

    impl Backend for SlowPoll {
        async fn load_config(&self) -> crate::Result<Value> {
            Ok(Value::Null)
        }

        async fn save_config(&self, _config: &crate::config::Configuration) -> crate::Result<()> {
            Ok(())
        }

        async fn poll_clipboard(&self) -> crate::Result<Option<Value>> {
            self.started.lock().await.push(Instant::now());
            sleep(Duration::from_millis(300)).await;
            Ok(None)
        }

        async fn load_locale(&self, _locale: &str) -> crate::Result<HashMap<String, String>> {
            Ok(HashMap::new())
        }

        fn exit_app(&self) {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_poll_keeps_fixed_cadence() {
        let backend = Arc::new(SlowPoll::default());
        let (handle, _rx) = overlay();
        let mut poller = EventPoller::new(CancellationToken::new());
        let origin = Instant::now();

        poller.start(backend.clone(), handle);
        sleep(Duration::from_millis(2000)).await;
        poller.shutdown().await;

        let offsets: Vec<u128> = backend
            .started
            .lock()
            .await
            .iter()
            .map(|at| (*at - origin).as_millis())
            .collect();
        assert_eq!(offsets, vec![0, 900, 1800]);
    }
}
