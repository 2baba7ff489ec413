//! Device push channel with auto-reconnect.
//!
//! Connects to the server's websocket endpoint and streams decoded
//! `{device, action}` events through a [`tokio::sync::broadcast`] channel.
//! Reconnection uses exponential backoff with jitter; connection status is
//! observable through a [`tokio::sync::watch`] channel.
//!
//! # Example
//!
//! ```rust,ignore
//! use sensornet_api::push::{PushHandle, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let url = Url::parse("ws://127.0.0.1:8000/ws/devices/")?;
//!
//! let handle = PushHandle::connect(url, ReconnectConfig::default(), cancel.clone());
//! let mut rx = handle.subscribe();
//!
//! while let Ok(event) = rx.recv().await {
//!     println!("{} -> {}", event.device, event.action);
//! }
//!
//! handle.shutdown();
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::{broadcast, watch};
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::models::PushEvent;

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 256;

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for push channel reconnection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum consecutive failed attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── PushStatus ───────────────────────────────────────────────────────

/// Connection status of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStatus {
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    /// Shut down or retries exhausted. Never re-opened.
    Closed,
}

// ── PushHandle ───────────────────────────────────────────────────────

/// Handle to a running push subscription.
///
/// Call [`shutdown`](Self::shutdown) to tear down the background task.
/// A closed handle stays closed; open a new one to resubscribe.
pub struct PushHandle {
    event_rx: broadcast::Receiver<Arc<PushEvent>>,
    status_rx: watch::Receiver<PushStatus>,
    cancel: CancellationToken,
}

impl PushHandle {
    /// Spawn the connect/reconnect loop and return immediately.
    ///
    /// The first connection attempt happens asynchronously. Must be called
    /// from within a tokio runtime.
    pub fn connect(url: Url, reconnect: ReconnectConfig, cancel: CancellationToken) -> Self {
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (status_tx, status_rx) = watch::channel(PushStatus::Connecting);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            push_loop(url, event_tx, status_tx, reconnect, task_cancel).await;
        });

        Self {
            event_rx,
            status_rx,
            cancel,
        }
    }

    /// Get a new receiver for the event stream.
    ///
    /// A consumer that falls behind receives
    /// [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PushEvent>> {
        self.event_rx.resubscribe()
    }

    /// Observe connection status changes.
    pub fn status(&self) -> watch::Receiver<PushStatus> {
        self.status_rx.clone()
    }

    /// Signal the background task to shut down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → on error, backoff → reconnect.
async fn push_loop(
    url: Url,
    event_tx: broadcast::Sender<Arc<PushEvent>>,
    status_tx: watch::Sender<PushStatus>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&url, &event_tx, &status_tx, &cancel) => result,
        };

        match result {
            // Clean disconnect: reconnect straight away.
            Ok(()) => {
                if cancel.is_cancelled() {
                    break;
                }
                tracing::info!("push channel disconnected cleanly, reconnecting");
                attempt = 0;
                let _ = status_tx.send(PushStatus::Reconnecting { attempt });
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "push channel error");

                if reconnect.max_retries.is_some_and(|max| attempt >= max) {
                    tracing::error!(attempt, "push channel reconnection limit reached, giving up");
                    break;
                }

                let delay = calculate_backoff(attempt, &reconnect);
                tracing::info!(
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    attempt,
                    "waiting before reconnect"
                );
                let _ = status_tx.send(PushStatus::Reconnecting { attempt });

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }

                attempt = attempt.saturating_add(1);
            }
        }
    }

    let _ = status_tx.send(PushStatus::Closed);
    tracing::debug!("push loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one websocket connection and read frames until it drops.
async fn connect_and_read(
    url: &Url,
    event_tx: &broadcast::Sender<Arc<PushEvent>>,
    status_tx: &watch::Sender<PushStatus>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to push channel");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::info!("push channel connected");
    let _ = status_tx.send(PushStatus::Connected);

    let (_write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        decode_and_broadcast(&text, event_tx);
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(cf) = frame {
                            tracing::info!(code = %cf.code, reason = %cf.reason, "push close frame received");
                        } else {
                            tracing::info!("push close frame received (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
                    None => {
                        tracing::info!("push stream ended");
                        return Ok(());
                    }
                    // tungstenite answers pings itself; binary frames are not used
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

// ── Frame decoding ───────────────────────────────────────────────────

/// A text frame carries either one event or a batch of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PushFrame {
    One(PushEvent),
    Batch(Vec<PushEvent>),
}

/// Decode a text frame into events. Malformed frames yield nothing.
fn decode_frame(text: &str) -> Vec<PushEvent> {
    match serde_json::from_str::<PushFrame>(text) {
        Ok(PushFrame::One(event)) => vec![event],
        Ok(PushFrame::Batch(events)) => events,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring undecodable push frame");
            Vec::new()
        }
    }
}

fn decode_and_broadcast(text: &str, event_tx: &broadcast::Sender<Arc<PushEvent>>) {
    for event in decode_frame(text) {
        tracing::debug!(device = %event.device, action = %event.action, "push event");
        // No subscribers right now is fine
        let _ = event_tx.send(Arc::new(event));
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) * (1 ± 0.25)`
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exp = i32::try_from(attempt.min(30)).unwrap_or(30);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exp);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();

    Duration::from_secs_f64((capped * jitter_factor).max(0.0))
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_reconnect_config() {
        let config = ReconnectConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert!(config.max_retries.is_none());
    }

    #[test]
    fn backoff_grows_then_caps() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_retries: None,
        };

        let d0 = calculate_backoff(0, &config);
        let d2 = calculate_backoff(2, &config);
        assert!(d2 > d0, "d2 ({d2:?}) should exceed d0 ({d0:?})");

        let d20 = calculate_backoff(20, &config);
        assert!(d20 <= Duration::from_millis(12_500), "capped delay was {d20:?}");
    }

    #[test]
    fn decodes_single_event() {
        let events = decode_frame(r#"{"device":"device1","action":"on"}"#);
        assert_eq!(
            events,
            vec![PushEvent {
                device: "device1".into(),
                action: "on".into()
            }]
        );
    }

    #[test]
    fn decodes_batch() {
        let events = decode_frame(
            r#"[{"device":"device2","action":"off"},{"device":"device3","action":"on"}]"#,
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].device, "device3");
    }

    #[test]
    fn malformed_frame_yields_nothing() {
        assert!(decode_frame("not json").is_empty());
        assert!(decode_frame(r#"{"device":"device1"}"#).is_empty());
    }

    #[test]
    fn broadcast_reaches_subscribers() {
        let (tx, mut rx) = broadcast::channel(4);
        decode_and_broadcast(r#"{"device":"device2","action":"on"}"#, &tx);
        let event = rx.try_recv().unwrap();
        assert_eq!(event.device, "device2");
        assert_eq!(event.action, "on");
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_closes_the_channel() {
        let cancel = CancellationToken::new();
        // Port 9 (discard) refuses connections; the loop sits in backoff.
        let url = Url::parse("ws://127.0.0.1:9/ws/devices/").unwrap();
        let handle = PushHandle::connect(url, ReconnectConfig::default(), cancel);
        let mut status = handle.status();

        handle.shutdown();

        let closed = status.wait_for(|s| *s == PushStatus::Closed).await;
        assert!(closed.is_ok());
    }
}
