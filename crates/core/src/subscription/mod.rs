//! Event subscriptions over server-sent event streams
//!
//! This module multiplexes long-lived event streams by [`EventCategory`]:
//! at most one stream is active per category, and replacing it closes the
//! old one first.
//!
//! # Architecture
//!
//! ```text
//! EventSubscriptionManager::subscribe(category)
//!   ├─ SubscriptionRegistry::take(category) ──► old StreamSession::close()
//!   ├─ EventTransport::open(url, signal_tx) ──► Box<dyn EventConnection>
//!   └─ StreamSession pump task
//!        signal_rx ──► SessionState::on_signal ──► Subscription (Result items)
//! ```
//!
//! The transport only reports what happened to the connection
//! ([`TransportSignal`]); classifying that into events and errors is done by
//! the transition table in [`state`], which knows nothing about HTTP.
//!
//! [`EventCategory`]: crate::EventCategory

use crate::Result;
use tokio::sync::mpsc;

pub mod manager;
pub mod registry;
pub mod session;
pub mod state;

pub use manager::{listener_path, EventSubscriptionManager, Subscription};
pub use registry::{SubscriptionRegistry, WeakSubscriptionRegistry};
pub use session::{SessionSnapshot, StreamSession};
pub use state::{
    SessionState, StreamError, StreamErrorKind, StreamEvent, SubscriptionItem, Transition,
    ERROR_STATUS, EVENT_NAME, EVENT_STATUS,
};

/// Connection-level occurrence reported by an [`EventTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSignal {
    /// Handshake completed, the stream is delivering events
    Opened,
    /// One dispatched event from the stream
    Message {
        /// Event name (`"message"` when the server sent none)
        event: String,
        /// Payload, untouched
        data: String,
        /// Last event id seen on the stream
        id: String,
    },
    /// The connection dropped and the transport is retrying on its own
    Connecting,
    /// The transport gave up; nothing further will be reported
    Closed,
    /// Any other transport failure
    Fault(String),
}

/// Handle to one open transport connection
pub trait EventConnection: Send {
    /// Stop the connection; no further signals are sent after this returns
    fn close(&mut self);
}

/// Something that can open event streams
///
/// Implementations report every connection state change through the
/// `signals` channel, in the order they happen.
pub trait EventTransport: Send + Sync {
    /// Whether this environment can open event streams at all
    fn supports_streaming(&self) -> bool {
        true
    }

    /// Open a stream to `url`
    ///
    /// # Errors
    ///
    /// Returns an error if the connection could not even be started (no
    /// async runtime, invalid URL). Failures after that are reported as
    /// signals.
    fn open(
        &self,
        url: &str,
        signals: mpsc::UnboundedSender<TransportSignal>,
    ) -> Result<Box<dyn EventConnection>>;
}
