//! Session context ownership.
//!
//! Authentication state is an explicit value passed to the backend client,
//! not ambient global state. One store owns the context; consumers read a
//! snapshot through [`SessionStore::current`], and invalidation is announced
//! through subscribed callbacks rather than a page reload from arbitrary
//! call sites.

use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};

/// A snapshot of the signed-in session, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Bearer token for backend requests
    pub access_token: Option<String>,
    /// Display label of the signed-in user
    pub user: Option<String>,
    /// Token expiry; `None` means no known expiry
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    /// A context holding only a bearer token.
    pub fn with_token(token: impl Into<String>) -> Self {
        SessionContext {
            access_token: Some(token.into()),
            ..Default::default()
        }
    }

    /// Whether the token's expiry is in the past.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| exp <= Utc::now()).unwrap_or(false)
    }

    /// The bearer token, if present and not expired.
    pub fn bearer(&self) -> Option<&str> {
        if self.is_expired() {
            return None;
        }
        self.access_token.as_deref()
    }
}

/// Owner of the session context.
///
/// The single authority for reading and clearing authentication state.
pub trait SessionStore: Send + Sync {
    /// Current session snapshot.
    fn current(&self) -> SessionContext;

    /// Drops the stored session, typically after the backend rejected it.
    fn clear(&self);
}

/// In-memory session store.
#[derive(Default)]
pub struct MemorySessionStore {
    context: RwLock<SessionContext>,
}

impl MemorySessionStore {
    /// Creates a store seeded with `context`.
    pub fn new(context: SessionContext) -> Self {
        MemorySessionStore {
            context: RwLock::new(context),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn current(&self) -> SessionContext {
        self.context
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.context.write() {
            *guard = SessionContext::default();
        }
    }
}

type InvalidatedCallback = Box<dyn Fn() + Send + Sync>;

/// Subscriber list for session invalidation.
///
/// Cloned handles share the same subscriber list.
#[derive(Clone, Default)]
pub struct SessionEvents {
    subscribers: Arc<Mutex<Vec<InvalidatedCallback>>>,
}

impl SessionEvents {
    /// Creates an empty subscriber list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback fired when the session is invalidated.
    pub fn on_invalidated(&self, callback: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(Box::new(callback));
        }
    }

    /// Notifies all subscribers.
    pub fn emit_invalidated(&self) {
        if let Ok(subscribers) = self.subscribers.lock() {
            for callback in subscribers.iter() {
                callback();
            }
        }
    }
}
