//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the credential directory, the shared storage backend, the routing
//! policy, and one live `SessionGuard` per browser client. A client's guard
//! plays the role of the in-memory session of an open tab; its durable
//! storage is the shared backend namespaced by client id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::session::{Directory, KeyValueStore, Namespaced, RoutingPolicy, SessionGuard};

// =============================================================================
// CLIENT SLOT
// =============================================================================

/// One browser client's live guard plus bookkeeping for idle eviction.
pub struct ClientSlot {
    pub guard: Mutex<SessionGuard>,
    last_seen: std::sync::Mutex<Instant>,
}

impl ClientSlot {
    fn new(guard: SessionGuard) -> Self {
        Self { guard: Mutex::new(guard), last_seen: std::sync::Mutex::new(Instant::now()) }
    }

    fn touch(&self) {
        *self
            .last_seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        let last = *self
            .last_seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        now.saturating_duration_since(last)
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<Directory>,
    pub store: Arc<dyn KeyValueStore>,
    pub policy: Arc<RoutingPolicy>,
    pub storage_key: String,
    pub cookie_secure: bool,
    pub clients: Arc<RwLock<HashMap<Uuid, Arc<ClientSlot>>>>,
}

impl AppState {
    #[must_use]
    pub fn new(
        directory: Arc<Directory>,
        store: Arc<dyn KeyValueStore>,
        policy: RoutingPolicy,
        storage_key: String,
        cookie_secure: bool,
    ) -> Self {
        Self {
            directory,
            store,
            policy: Arc::new(policy),
            storage_key,
            cookie_secure,
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// A guard that has not been restored yet, over this client's storage.
    fn fresh_guard(&self, client_id: Uuid) -> SessionGuard {
        let storage = Namespaced::new(self.store.clone(), client_id.to_string());
        SessionGuard::new(self.directory.clone(), Arc::new(storage), self.policy.clone())
            .with_storage_key(self.storage_key.clone())
    }

    /// Return the live slot for `client_id`, starting one (and restoring its
    /// persisted session) on first contact.
    pub async fn client(&self, client_id: Uuid) -> Arc<ClientSlot> {
        if let Some(slot) = self.clients.read().await.get(&client_id) {
            slot.touch();
            return slot.clone();
        }

        let mut guard = self.fresh_guard(client_id);
        guard.restore().await;
        let slot = Arc::new(ClientSlot::new(guard));

        let mut clients = self.clients.write().await;
        let slot = clients.entry(client_id).or_insert(slot);
        slot.touch();
        slot.clone()
    }

    /// Guard for a client id minted by this request. Its namespace is new,
    /// so there is nothing to restore, and it is not registered: clients
    /// that never send the cookie back leave no slot behind.
    #[must_use]
    pub fn unregistered(&self, client_id: Uuid) -> SessionGuard {
        let mut guard = self.fresh_guard(client_id);
        guard.start_empty();
        guard
    }

    /// Make `guard` the live guard for `client_id`.
    pub async fn register(&self, client_id: Uuid, guard: SessionGuard) -> Arc<ClientSlot> {
        let slot = Arc::new(ClientSlot::new(guard));
        self.clients
            .write()
            .await
            .insert(client_id, slot.clone());
        slot
    }

    /// Run `f` against the client's guard. A `fresh` client is answered
    /// from an unregistered guard.
    pub async fn inspect<R>(&self, client_id: Uuid, fresh: bool, f: impl FnOnce(&SessionGuard) -> R) -> R {
        if fresh {
            return f(&self.unregistered(client_id));
        }
        let slot = self.client(client_id).await;
        let guard = slot.guard.lock().await;
        f(&guard)
    }

    /// Drop the client's in-memory session and restore from storage, as a
    /// page reload does.
    pub async fn reload_client(&self, client_id: Uuid) -> Arc<ClientSlot> {
        let mut guard = self.fresh_guard(client_id);
        guard.restore().await;
        self.register(client_id, guard).await
    }

    /// Evict clients idle for at least `ttl`. Returns how many were dropped.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        self.evict_idle_at(ttl, Instant::now()).await
    }

    async fn evict_idle_at(&self, ttl: Duration, now: Instant) -> usize {
        let mut clients = self.clients.write().await;
        let before = clients.len();
        clients.retain(|_, slot| slot.idle_for(now) < ttl);
        before - clients.len()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
