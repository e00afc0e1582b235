//! Registry of active stream sessions, one per event category

use super::session::{SessionSnapshot, StreamSession};
use crate::EventCategory;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// Authoritative map from event category to its active stream session
///
/// The registry owns every live session; everything else only sees
/// [`SessionSnapshot`]s. Cloning the registry clones the handle, not the
/// map. All operations are short, non-blocking map operations behind one
/// mutex, so a category always has a single writer at a time.
///
/// # Example
///
/// ```
/// use are_rest_core::{EventCategory, SubscriptionRegistry};
///
/// let registry = SubscriptionRegistry::new();
/// assert!(registry.is_empty());
/// assert!(registry.take(EventCategory::ModelChanged).is_none());
/// ```
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    sessions: Arc<Mutex<HashMap<EventCategory, StreamSession>>>,
}

impl SubscriptionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `session`, returning whatever was installed before
    ///
    /// The caller is responsible for closing the returned session.
    pub fn put(&self, category: EventCategory, session: StreamSession) -> Option<StreamSession> {
        self.sessions.lock().insert(category, session)
    }

    /// Remove and return the session for `category`
    pub fn take(&self, category: EventCategory) -> Option<StreamSession> {
        self.sessions.lock().remove(&category)
    }

    /// Inspect the session for `category` without removing it
    pub fn peek(&self, category: EventCategory) -> Option<SessionSnapshot> {
        self.sessions.lock().get(&category).map(StreamSession::snapshot)
    }

    pub fn contains(&self, category: EventCategory) -> bool {
        self.sessions.lock().contains_key(&category)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Categories with a registered session, in no particular order
    pub fn categories(&self) -> Vec<EventCategory> {
        self.sessions.lock().keys().copied().collect()
    }

    /// Remove the session for `category` only if it is still `session_id`
    pub fn remove_if_current(
        &self,
        category: EventCategory,
        session_id: Uuid,
    ) -> Option<StreamSession> {
        let mut sessions = self.sessions.lock();
        match sessions.get(&category) {
            Some(session) if session.id() == session_id => sessions.remove(&category),
            _ => None,
        }
    }

    /// Close and remove every session; returns how many were closed
    pub fn close_all(&self) -> usize {
        // Drain under the lock, close outside it
        let drained: Vec<StreamSession> = self.sessions.lock().drain().map(|(_, s)| s).collect();
        let count = drained.len();
        for mut session in drained {
            session.close();
        }
        if count > 0 {
            tracing::info!(count, "Closed all event streams");
        }
        count
    }

    pub(crate) fn downgrade(&self) -> WeakSubscriptionRegistry {
        WeakSubscriptionRegistry {
            sessions: Arc::downgrade(&self.sessions),
        }
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("categories", &self.categories())
            .finish()
    }
}

/// Non-owning registry handle held by session pump tasks
#[derive(Clone, Debug)]
pub struct WeakSubscriptionRegistry {
    sessions: Weak<Mutex<HashMap<EventCategory, StreamSession>>>,
}

impl WeakSubscriptionRegistry {
    pub fn remove_if_current(
        &self,
        category: EventCategory,
        session_id: Uuid,
    ) -> Option<StreamSession> {
        let sessions = self.sessions.upgrade()?;
        SubscriptionRegistry { sessions }.remove_if_current(category, session_id)
    }
}
