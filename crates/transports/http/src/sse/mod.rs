//! Server-sent events: body parser and the reqwest-backed event transport

pub mod parser;
pub mod transport;

pub use parser::{EventStreamParser, SseEvent, DEFAULT_EVENT_TYPE};
pub use transport::{SseConnection, SseTransport};
