//! ARE REST Core - transport-agnostic client core
//!
//! This crate holds everything about talking to an ARE runtime environment
//! that does not depend on a particular HTTP stack:
//!
//! - The path-segment encoding the server expects ([`encoding`])
//! - Wire value types ([`EventCategory`], [`PortDatatype`])
//! - Event subscriptions: one stream per category, tracked by a
//!   [`SubscriptionRegistry`] and driven by an explicit state machine
//!   ([`subscription`])
//! - Client configuration ([`config`])
//!
//! Transport implementations (see `are-rest-http`) depend on this crate and
//! implement [`EventTransport`].
//!
//! # Example
//!
//! ```ignore
//! use are_rest_core::{EventCategory, EventSubscriptionManager, SubscriptionRegistry};
//! use std::sync::Arc;
//!
//! let registry = SubscriptionRegistry::new();
//! let manager = EventSubscriptionManager::new(
//!     "http://localhost:8081/rest/",
//!     Arc::new(my_transport),
//!     registry.clone(),
//! );
//!
//! let mut models = manager.subscribe(EventCategory::ModelChanged, None)?;
//! while let Some(Ok(event)) = models.next_item().await {
//!     println!("model changed: {}", event.payload);
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod encoding;
pub mod error;
pub mod subscription;
pub mod types;

pub use config::{ClientConfig, DEFAULT_BASE_URI};
pub use error::{Error, Result};
pub use subscription::{
    EventConnection, EventSubscriptionManager, EventTransport, SessionSnapshot, SessionState,
    StreamError, StreamErrorKind, StreamEvent, Subscription, SubscriptionItem,
    SubscriptionRegistry, TransportSignal,
};
pub use types::{EventCategory, PortDatatype};
