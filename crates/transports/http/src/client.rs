//! Client facade: REST resources plus event subscriptions for one server

use crate::dispatcher::RequestDispatcher;
use crate::error::Result;
use crate::sse::SseTransport;
use are_rest_core::{
    ClientConfig, EventCategory, EventSubscriptionManager, EventTransport, Subscription,
    SubscriptionRegistry,
};
use std::sync::Arc;

/// Talks to one ARE runtime environment
///
/// REST calls go through [`rest`](Self::rest); event streams are managed
/// by the subscription methods, one active stream per category. Dropping the
/// client closes every stream it opened. The base URI cannot be changed
/// after construction.
///
/// # Example
///
/// ```ignore
/// use are_rest_core::{ClientConfig, EventCategory};
/// use are_rest_http::{AreClient, WriteMethod};
///
/// let client = AreClient::new(ClientConfig::load(Some("are.toml"))?)?;
/// client.rest().start_model(WriteMethod::Put).await?;
///
/// let mut states = client.subscribe(EventCategory::ModelStateChanged, None)?;
/// while let Some(item) = states.next_item().await {
///     println!("{:?}", item);
/// }
/// ```
pub struct AreClient {
    config: ClientConfig,
    rest: RequestDispatcher,
    events: EventSubscriptionManager,
}

impl AreClient {
    /// Build a client with the reqwest event transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = SseTransport::new(config.stream.clone())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Client for `base_uri` with default settings
    pub fn with_base_uri(base_uri: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::with_base_uri(base_uri))
    }

    /// Build a client that opens event streams through `transport`
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn EventTransport>) -> Result<Self> {
        config.validate()?;

        let base_uri = config.server.base_uri.clone();
        let rest = RequestDispatcher::from_config(base_uri.clone(), &config.http)?;
        let events = EventSubscriptionManager::new(base_uri, transport, SubscriptionRegistry::new());

        tracing::debug!(base_uri = %config.server.base_uri, "ARE client created");
        Ok(Self {
            config,
            rest,
            events,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URI for REST calls and event streams
    ///
    /// Fixed for the client's lifetime; to talk to another server, build a
    /// new client.
    pub fn base_uri(&self) -> &str {
        &self.config.server.base_uri
    }

    /// REST resource calls
    pub fn rest(&self) -> &RequestDispatcher {
        &self.rest
    }

    pub fn events(&self) -> &EventSubscriptionManager {
        &self.events
    }

    /// Subscribe to `category`, replacing any current subscription for it
    pub fn subscribe(&self, category: EventCategory, channel_id: Option<&str>) -> Result<Subscription> {
        Ok(self.events.subscribe(category, channel_id)?)
    }

    /// Subscribe by category name, e.g. `"property_changed"`
    pub fn subscribe_named(&self, name: &str, channel_id: Option<&str>) -> Result<Subscription> {
        Ok(self.events.subscribe_named(name, channel_id)?)
    }

    pub fn unsubscribe(&self, category: EventCategory) -> bool {
        self.events.unsubscribe(category)
    }

    pub fn close_event_source(&self, category: EventCategory) -> bool {
        self.events.close_event_source(category)
    }

    /// Close every open event stream
    pub fn close_all(&self) -> usize {
        self.events.close_all()
    }
}

impl std::fmt::Debug for AreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AreClient")
            .field("base_uri", &self.base_uri())
            .field("subscriptions", self.events.registry())
            .finish()
    }
}
