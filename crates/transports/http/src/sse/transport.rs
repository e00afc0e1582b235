//! Server-sent events over reqwest
//!
//! Each opened connection is one background driver task:
//!
//! ```text
//! open(url) ──► tokio::spawn(drive_stream)
//!                  │
//!                  ├── GET url (Accept: text/event-stream)
//!                  │     ├── non-2xx / wrong content type ──► Closed, stop
//!                  │     └── 2xx ──► Opened, then Message per event
//!                  │
//!                  └── network error / body ends
//!                        ──► Connecting, sleep(reconnect delay), GET again
//!                        (attempt limit exhausted ──► Closed, stop)
//! ```
//!
//! Signals go to the session pump over an unbounded channel. The driver
//! stops when the connection is closed or nobody listens anymore.

use super::parser::EventStreamParser;
use crate::error::Result;
use are_rest_core::config::StreamConfig;
use are_rest_core::{Error as CoreError, EventConnection, EventTransport, TransportSignal};
use futures::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const EVENT_STREAM_MIME: &str = "text/event-stream";

/// [`EventTransport`] backed by reqwest
#[derive(Debug, Clone)]
pub struct SseTransport {
    client: reqwest::Client,
    config: StreamConfig,
}

impl SseTransport {
    /// Create a transport using `config` for reconnects and handshake timeouts
    pub fn new(config: StreamConfig) -> Result<Self> {
        // No whole-request timeout: streams are long-lived
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

impl EventTransport for SseTransport {
    fn open(
        &self,
        url: &str,
        signals: mpsc::UnboundedSender<TransportSignal>,
    ) -> are_rest_core::Result<Box<dyn EventConnection>> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CoreError::Transport(format!("no async runtime: {}", e)))?;

        let driver = runtime.spawn(drive_stream(
            self.client.clone(),
            url.to_string(),
            self.config.clone(),
            signals,
        ));

        Ok(Box::new(SseConnection {
            url: url.to_string(),
            driver: Some(driver),
        }))
    }
}

/// Handle to one running driver task
#[derive(Debug)]
pub struct SseConnection {
    url: String,
    driver: Option<JoinHandle<()>>,
}

impl EventConnection for SseConnection {
    fn close(&mut self) {
        if let Some(driver) = self.driver.take() {
            tracing::debug!(url = %self.url, "Stopping event stream driver");
            driver.abort();
        }
    }
}

impl Drop for SseConnection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Why a connection attempt produced no event stream
enum ConnectFailure {
    /// The server answered but refused the stream; do not retry
    Refused(String),
    /// No usable response; retry after the reconnect delay
    Unreachable(String),
}

async fn connect(
    client: &reqwest::Client,
    url: &str,
    last_event_id: Option<&str>,
    handshake_timeout: Duration,
) -> std::result::Result<reqwest::Response, ConnectFailure> {
    let mut request = client
        .get(url)
        .header(ACCEPT, EVENT_STREAM_MIME)
        .header(CACHE_CONTROL, "no-cache");
    if let Some(id) = last_event_id {
        request = request.header("Last-Event-ID", id);
    }

    let response = tokio::time::timeout(handshake_timeout, request.send())
        .await
        .map_err(|_| ConnectFailure::Unreachable(format!("handshake timed out after {:?}", handshake_timeout)))?
        .map_err(|e| ConnectFailure::Unreachable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ConnectFailure::Refused(format!("status {}", status)));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with(EVENT_STREAM_MIME) {
        return Err(ConnectFailure::Refused(format!(
            "unexpected content type '{}'",
            content_type
        )));
    }

    Ok(response)
}

/// Connect, forward events, reconnect until closed or refused
async fn drive_stream(
    client: reqwest::Client,
    url: String,
    config: StreamConfig,
    signals: mpsc::UnboundedSender<TransportSignal>,
) {
    let mut delay = config.reconnect_delay();
    let mut last_event_id: Option<String> = None;
    let mut failed_attempts: u32 = 0;

    loop {
        tracing::debug!(url = %url, attempt = failed_attempts, "Connecting event stream");

        match connect(&client, &url, last_event_id.as_deref(), config.connect_timeout()).await {
            Ok(response) => {
                failed_attempts = 0;
                tracing::info!(url = %url, "Event stream connected");
                if signals.send(TransportSignal::Opened).is_err() {
                    return;
                }

                let mut parser = EventStreamParser::new();
                if let Some(id) = &last_event_id {
                    tracing::debug!(url = %url, last_event_id = %id, "Resuming event stream");
                }
                let mut body = response.bytes_stream();

                loop {
                    match body.next().await {
                        Some(Ok(chunk)) => {
                            for item in parser.feed(&chunk) {
                                let signal = match item {
                                    Ok(event) => TransportSignal::Message {
                                        event: event.event,
                                        data: event.data,
                                        id: event.id,
                                    },
                                    Err(e) => {
                                        tracing::warn!(url = %url, error = %e, "Undecodable event stream line");
                                        TransportSignal::Fault(format!("invalid UTF-8 in event stream: {}", e))
                                    }
                                };
                                if signals.send(signal).is_err() {
                                    return;
                                }
                            }
                            if let Some(id) = parser.id_update() {
                                // An empty id resets it: reconnect without the header
                                last_event_id = Some(id).filter(|id| !id.is_empty()).map(str::to_string);
                            }
                            if let Some(retry) = parser.reconnect_time() {
                                delay = retry;
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(url = %url, error = %e, "Event stream interrupted");
                            break;
                        }
                        None => {
                            tracing::warn!(url = %url, "Event stream ended by server");
                            break;
                        }
                    }
                }
            }
            Err(ConnectFailure::Refused(reason)) => {
                tracing::error!(url = %url, reason = %reason, "Event stream refused, not reconnecting");
                let _ = signals.send(TransportSignal::Closed);
                return;
            }
            Err(ConnectFailure::Unreachable(reason)) => {
                tracing::warn!(url = %url, reason = %reason, "Event stream connection failed");
            }
        }

        if let Some(max) = config.max_reconnect_attempts {
            if failed_attempts >= max {
                tracing::error!(url = %url, attempts = max, "Max event stream reconnect attempts exceeded");
                let _ = signals.send(TransportSignal::Closed);
                return;
            }
        }
        failed_attempts = failed_attempts.saturating_add(1);

        if signals.send(TransportSignal::Connecting).is_err() {
            return;
        }
        tracing::debug!(url = %url, delay_ms = delay.as_millis() as u64, "Reconnecting event stream after delay");
        tokio::time::sleep(delay).await;
    }
}
