//! Application state management.

use crate::auth::SessionStore;
use crate::config::Config;
use crate::orders::{OrderNumbering, OrderProcessor};
use crate::store::{MemoryStore, Store};
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Active storage backend, chosen once at start-up.
    pub store: Arc<dyn Store>,
    /// Order placement and numbering.
    pub orders: Arc<OrderProcessor>,
    /// Open bearer-token sessions.
    pub sessions: Arc<SessionStore>,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates the state around a store, numbering orders per the config.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let numbering = OrderNumbering::new(
            config.orders.prefix.clone(),
            config.orders.sequence_base,
        );

        Self {
            store,
            orders: Arc::new(OrderProcessor::new(numbering)),
            sessions: Arc::new(SessionStore::new()),
            config: Arc::new(config),
        }
    }

    /// Creates a state over a freshly seeded in-memory store with default
    /// configuration.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::seeded()), Config::default())
    }

    /// Name of the active backend.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.store.backend().as_str()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}
