//! Stream session state machine
//!
//! # States
//!
//! - **Connecting**: connection requested, handshake not finished
//! - **Open**: events are flowing
//! - **Erroring**: the transport lost the connection and is reconnecting
//! - **Closed**: terminal, nothing more is delivered
//!
//! # State Transitions
//!
//! ```text
//! Connecting ──(Opened)──> Open ──(Connecting)──> Erroring
//!     │                     ↑                        │
//!     │                     └───────(Opened)─────────┘
//!     │
//!     └──────(Closed, from any live state)──────> Closed
//! ```
//!
//! `Fault` signals produce an error item but never move the state.

use super::TransportSignal;
use std::fmt;

/// Status attached to every delivered event
pub const EVENT_STATUS: u16 = 200;

/// Status attached to every stream error
pub const ERROR_STATUS: u16 = 400;

/// Only stream events with this name reach subscribers
pub const EVENT_NAME: &str = "event";

/// Lifecycle state of one stream session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the handshake
    Connecting,
    /// Delivering events
    Open,
    /// Transport is reconnecting on its own
    Erroring,
    /// Terminal
    Closed,
}

impl SessionState {
    pub fn is_closed(&self) -> bool {
        matches!(self, SessionState::Closed)
    }

    /// Evaluate one transport signal against the current state
    pub fn on_signal(self, signal: &TransportSignal) -> Transition {
        use SessionState::*;

        if self == Closed {
            return Transition::stay(Closed);
        }

        match signal {
            TransportSignal::Opened => Transition::stay(Open),
            TransportSignal::Message { event, data, .. } if event == EVENT_NAME => Transition {
                next: Open,
                outcome: Some(Ok(StreamEvent::new(data.clone()))),
            },
            TransportSignal::Message { .. } => Transition::stay(self),
            TransportSignal::Connecting => Transition {
                next: Erroring,
                outcome: Some(Err(StreamError::new(StreamErrorKind::Reconnecting))),
            },
            TransportSignal::Closed => Transition {
                next: Closed,
                outcome: Some(Err(StreamError::new(StreamErrorKind::ConnectionLost))),
            },
            TransportSignal::Fault(_) => Transition {
                next: self,
                outcome: Some(Err(StreamError::new(StreamErrorKind::SomeErrorOccurred))),
            },
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Connecting => "connecting",
            SessionState::Open => "open",
            SessionState::Erroring => "erroring",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Result of evaluating one signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the signal
    pub next: SessionState,
    /// Item to hand to the subscriber, if any
    pub outcome: Option<SubscriptionItem>,
}

impl Transition {
    fn stay(next: SessionState) -> Self {
        Self {
            next,
            outcome: None,
        }
    }
}

/// What a subscriber receives for each delivered item
pub type SubscriptionItem = std::result::Result<StreamEvent, StreamError>;

/// One server-pushed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    /// Event payload, unparsed
    pub payload: String,
    /// Always [`EVENT_STATUS`]
    pub status: u16,
}

impl StreamEvent {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            status: EVENT_STATUS,
        }
    }
}

/// Why a stream reported an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamErrorKind {
    /// Transient: the transport is reconnecting, no action needed
    Reconnecting,
    /// Terminal: subscribe again to resume
    ConnectionLost,
    /// Anything else
    SomeErrorOccurred,
}

impl StreamErrorKind {
    /// Reason string as reported to callers
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamErrorKind::Reconnecting => "reconnecting",
            StreamErrorKind::ConnectionLost => "connectionLost",
            StreamErrorKind::SomeErrorOccurred => "someErrorOccurred",
        }
    }
}

/// Stream-level error delivered to a subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("stream error {status}: {}", kind.as_str())]
pub struct StreamError {
    /// Always [`ERROR_STATUS`]
    pub status: u16,
    pub kind: StreamErrorKind,
}

impl StreamError {
    pub fn new(kind: StreamErrorKind) -> Self {
        Self {
            status: ERROR_STATUS,
            kind,
        }
    }

    pub fn reason(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Whether the session is still alive and may recover without caller action
    pub fn is_transient(&self) -> bool {
        !matches!(self.kind, StreamErrorKind::ConnectionLost)
    }
}
