//! One live event stream and its lifecycle

use super::registry::WeakSubscriptionRegistry;
use super::state::{SessionState, SubscriptionItem};
use super::{EventConnection, EventTransport, TransportSignal};
use crate::{Error, EventCategory, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Read-only view of a registered session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub category: EventCategory,
    pub url: String,
    pub state: SessionState,
}

/// One event stream connection plus its lifecycle state
///
/// Owned by the [`SubscriptionRegistry`](super::SubscriptionRegistry).
/// Dropping a session closes it.
pub struct StreamSession {
    id: Uuid,
    category: EventCategory,
    url: String,
    state: Arc<Mutex<SessionState>>,
    connection: Option<Box<dyn EventConnection>>,
    pump: Option<JoinHandle<()>>,
}

impl StreamSession {
    /// Open a connection to `url` and start routing its signals to `subscriber`
    ///
    /// Fails with `Error::Transport` outside a tokio runtime.
    pub(crate) fn start(
        category: EventCategory,
        url: String,
        transport: &dyn EventTransport,
        registry: WeakSubscriptionRegistry,
        subscriber: mpsc::UnboundedSender<SubscriptionItem>,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Transport(format!("no async runtime: {}", e)))?;
        let id = Uuid::new_v4();
        let state = Arc::new(Mutex::new(SessionState::Connecting));
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        tracing::debug!(session_id = %id, category = %category, url = %url, "Opening event stream");
        let connection = transport.open(&url, signal_tx)?;

        let pump = runtime.spawn(pump_signals(
            id,
            category,
            Arc::clone(&state),
            signal_rx,
            subscriber,
            registry,
        ));

        Ok(Self {
            id,
            category,
            url,
            state,
            connection: Some(connection),
            pump: Some(pump),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn category(&self) -> EventCategory {
        self.category
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub fn is_closed(&self) -> bool {
        self.state().is_closed()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            category: self.category,
            url: self.url.clone(),
            state: self.state(),
        }
    }

    /// Force-close the stream
    ///
    /// Idempotent. Once this returns the subscriber receives nothing more,
    /// and its stream ends.
    pub fn close(&mut self) {
        {
            let mut state = self.state.lock();
            if !state.is_closed() {
                tracing::info!(session_id = %self.id, category = %self.category, "Closing event stream");
            }
            *state = SessionState::Closed;
        }

        if let Some(mut connection) = self.connection.take() {
            connection.close();
        }
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("url", &self.url)
            .field("state", &self.state())
            .finish()
    }
}

/// Drive one session: apply each transport signal in arrival order
async fn pump_signals(
    id: Uuid,
    category: EventCategory,
    state: Arc<Mutex<SessionState>>,
    mut signals: mpsc::UnboundedReceiver<TransportSignal>,
    subscriber: mpsc::UnboundedSender<SubscriptionItem>,
    registry: WeakSubscriptionRegistry,
) {
    while let Some(signal) = signals.recv().await {
        let reached_closed = {
            // Holding the state lock while forwarding keeps close() from
            // interleaving with a delivery.
            let mut current = state.lock();
            if current.is_closed() {
                break;
            }

            let transition = current.on_signal(&signal);
            if transition.next != *current {
                tracing::debug!(
                    session_id = %id,
                    category = %category,
                    from = %*current,
                    to = %transition.next,
                    "Event stream state changed"
                );
            }
            if *current == SessionState::Connecting && transition.next == SessionState::Open {
                tracing::info!(session_id = %id, category = %category, "Event stream open, waiting for messages");
            }
            *current = transition.next;

            if let Some(outcome) = transition.outcome {
                if let Err(err) = &outcome {
                    tracing::warn!(session_id = %id, category = %category, reason = err.reason(), "Event stream error");
                }
                if subscriber.send(outcome).is_err() {
                    tracing::debug!(session_id = %id, "Subscriber dropped, ignoring further events");
                }
            }

            current.is_closed()
        };

        if reached_closed {
            // Dropping the removed session aborts this task, so nothing may
            // follow the drop.
            if let Some(session) = registry.remove_if_current(category, id) {
                tracing::debug!(session_id = %id, category = %category, "Removed closed session from registry");
                drop(session);
            }
            return;
        }
    }
}
