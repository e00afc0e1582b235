//! HTTP/REST transport for the ARE REST client with SSE event streams
//!
//! # Features
//!
//! - **REST resources**: typed wrappers for every runtime, channel, port and
//!   storage resource, each issuing one request via [`RequestDispatcher`]
//! - **Event streams**: [`SseTransport`] implements
//!   [`EventTransport`](are_rest_core::EventTransport) with automatic
//!   reconnects and `Last-Event-ID` resumption
//! - **Facade**: [`AreClient`] wires both to one configured server
//!
//! # Usage
//!
//! ```ignore
//! use are_rest_core::EventCategory;
//! use are_rest_http::AreClient;
//!
//! let client = AreClient::with_base_uri("http://localhost:8081/rest/")?;
//!
//! match client.rest().get_model_state().await {
//!     Ok(response) => println!("{} ({})", response.body, response.status_text),
//!     Err(err) => eprintln!("{}", err),
//! }
//!
//! let mut models = client.subscribe(EventCategory::ModelChanged, None)?;
//! while let Some(item) = models.next_item().await {
//!     println!("{:?}", item);
//! }
//! ```

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod resources;
pub mod sse;

// Re-export main types
pub use client::AreClient;
pub use dispatcher::{RequestDispatcher, RestRequest, RestResponse, WriteMethod};
pub use error::{DispatchError, Error, Result};
pub use sse::{EventStreamParser, SseEvent, SseTransport};
