//! Public subscription surface: subscribe, unsubscribe, close

use super::registry::SubscriptionRegistry;
use super::session::StreamSession;
use super::state::SubscriptionItem;
use super::EventTransport;
use crate::encoding::encode;
use crate::{EventCategory, Error, Result};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Resource path of the listener for `category`, relative to the base URI
///
/// # Errors
///
/// Returns `Error::MissingParameter` for
/// [`EventCategory::DataChannelTransmission`] when `channel_id` is absent or
/// empty.
pub fn listener_path(category: EventCategory, channel_id: Option<&str>) -> Result<String> {
    let path = match category {
        EventCategory::ModelChanged => "runtime/deployment/listener".to_string(),
        EventCategory::ModelStateChanged => "runtime/model/state/listener".to_string(),
        EventCategory::EventChannelTransmission => {
            "runtime/model/channels/event/listener".to_string()
        }
        EventCategory::DataChannelTransmission => {
            let channel_id = channel_id
                .filter(|id| !id.is_empty())
                .ok_or(Error::MissingParameter("channel_id"))?;
            format!("runtime/model/channels/data/{}/listener", encode(channel_id))
        }
        EventCategory::PropertyChanged => {
            "runtime/model/components/properties/listener".to_string()
        }
    };
    Ok(path)
}

/// Manages one event stream per category against a single server
///
/// # Example
///
/// ```ignore
/// use are_rest_core::{EventCategory, EventSubscriptionManager, SubscriptionRegistry};
///
/// let manager = EventSubscriptionManager::new(base_uri, transport, SubscriptionRegistry::new());
/// let mut subscription = manager.subscribe(EventCategory::ModelStateChanged, None)?;
/// while let Some(item) = subscription.next_item().await {
///     match item {
///         Ok(event) => println!("{}", event.payload),
///         Err(err) if err.is_transient() => continue,
///         Err(_) => break,
///     }
/// }
/// manager.unsubscribe(EventCategory::ModelStateChanged);
/// ```
pub struct EventSubscriptionManager {
    base_uri: String,
    transport: Arc<dyn EventTransport>,
    registry: SubscriptionRegistry,
}

impl EventSubscriptionManager {
    /// Create a manager that resolves listener paths against `base_uri`
    pub fn new(
        base_uri: impl Into<String>,
        transport: Arc<dyn EventTransport>,
        registry: SubscriptionRegistry,
    ) -> Self {
        Self {
            base_uri: base_uri.into(),
            transport,
            registry,
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Subscribe to `category`, replacing any existing subscription for it
    ///
    /// The existing session, if any, is closed before the new connection is
    /// opened.
    ///
    /// # Errors
    ///
    /// * `Error::StreamingUnsupported` - the transport cannot stream
    /// * `Error::MissingParameter` - data-channel category without channel id
    /// * `Error::Transport` - no tokio runtime, or the transport could not
    ///   start the connection
    ///
    /// The first two are detected before any existing subscription is
    /// touched or a connection is attempted.
    pub fn subscribe(
        &self,
        category: EventCategory,
        channel_id: Option<&str>,
    ) -> Result<Subscription> {
        if !self.transport.supports_streaming() {
            tracing::error!(category = %category, "Event streams are not supported by this transport");
            return Err(Error::StreamingUnsupported);
        }

        let path = listener_path(category, channel_id)?;
        let url = format!("{}{}", self.base_uri, path);

        if let Some(mut previous) = self.registry.take(category) {
            tracing::debug!(session_id = %previous.id(), category = %category, "Replacing existing subscription");
            previous.close();
        }

        let (item_tx, item_rx) = mpsc::unbounded_channel();
        let session = StreamSession::start(
            category,
            url,
            self.transport.as_ref(),
            self.registry.downgrade(),
            item_tx,
        )?;
        let session_id = session.id();

        // Another caller may have raced us between take and put
        if let Some(mut raced) = self.registry.put(category, session) {
            raced.close();
        }

        // The transport may have given up before the session was installed,
        // in which case its pump found nothing to remove.
        if self
            .registry
            .peek(category)
            .is_some_and(|snapshot| snapshot.id == session_id && snapshot.state.is_closed())
        {
            self.registry.remove_if_current(category, session_id);
        }

        tracing::info!(session_id = %session_id, category = %category, "Subscribed");
        Ok(Subscription {
            category,
            session_id,
            items: item_rx,
        })
    }

    /// Subscribe using a category name such as `"model_state_changed"`
    ///
    /// # Errors
    ///
    /// `Error::UnknownCategory` for unrecognized names, otherwise as
    /// [`subscribe`](Self::subscribe).
    pub fn subscribe_named(&self, name: &str, channel_id: Option<&str>) -> Result<Subscription> {
        let category: EventCategory = name.parse().map_err(|e| {
            tracing::error!(name, "Unknown event category");
            e
        })?;
        self.subscribe(category, channel_id)
    }

    /// Stop the subscription for `category`
    ///
    /// Returns `false` if there was none.
    pub fn unsubscribe(&self, category: EventCategory) -> bool {
        self.close_event_source(category)
    }

    /// Remove and close the stream for `category`
    ///
    /// Returns `true` if a stream was closed, `false` if none was registered.
    pub fn close_event_source(&self, category: EventCategory) -> bool {
        match self.registry.take(category) {
            Some(mut session) => {
                session.close();
                tracing::info!(session_id = %session.id(), category = %category, "Unsubscribed");
                true
            }
            None => {
                tracing::debug!(category = %category, "No subscription to close");
                false
            }
        }
    }

    /// Close every stream this manager's registry holds
    pub fn close_all(&self) -> usize {
        self.registry.close_all()
    }
}

/// Items delivered for one subscription, in arrival order
///
/// Ends once the session is closed, either by the caller or after a
/// `connectionLost` error.
#[derive(Debug)]
pub struct Subscription {
    category: EventCategory,
    session_id: Uuid,
    items: mpsc::UnboundedReceiver<SubscriptionItem>,
}

impl Subscription {
    pub fn category(&self) -> EventCategory {
        self.category
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Receive the next item, waiting until one is available
    pub async fn next_item(&mut self) -> Option<SubscriptionItem> {
        self.items.recv().await
    }

    /// Receive an already-delivered item without waiting
    pub fn try_next_item(&mut self) -> Option<SubscriptionItem> {
        self.items.try_recv().ok()
    }
}

impl Stream for Subscription {
    type Item = SubscriptionItem;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().items.poll_recv(cx)
    }
}
