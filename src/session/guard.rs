//! Session guard — owns the current session and gates navigation.
//!
//! DESIGN
//! ======
//! State changes go through the pure [`transition`] function; redirects go
//! through the pure [`RoutingPolicy::decide`]. The guard only sequences the
//! two and talks to the storage port. Every failure degrades to
//! "unauthenticated" or "unchanged" and is logged, never returned.
//!
//! `loading` starts set and is cleared by the first `restore()` (or
//! `start_empty()` for storage known to be blank). Until then
//! `navigate` issues no redirect, so a persisted session is not bounced to
//! the entry point before it has been read.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::directory::Directory;
use super::model::{Role, Session, SessionState};
use super::routing::RoutingPolicy;
use super::store::KeyValueStore;

/// Storage key holding the persisted session record.
pub const DEFAULT_STORAGE_KEY: &str = "mediconnect_user";

// =============================================================================
// STATE TRANSITIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A persisted record was read and decoded.
    Restored(Session),
    /// No usable persisted record (absent, corrupt, or unreadable).
    RestoreEmpty,
    LoggedIn(Session),
    LoginRejected,
    LoggedOut,
}

/// Next session state after `event`. Pure.
#[must_use]
pub fn transition(state: &SessionState, event: SessionEvent) -> SessionState {
    match event {
        SessionEvent::Restored(session) | SessionEvent::LoggedIn(session) => SessionState::Authenticated(session),
        SessionEvent::RestoreEmpty | SessionEvent::LoggedOut => SessionState::Unauthenticated,
        SessionEvent::LoginRejected => state.clone(),
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Read-only copy of the guard's state handed to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub loading: bool,
    pub role: Option<Role>,
    pub session: Option<Session>,
}

// =============================================================================
// GUARD
// =============================================================================

pub struct SessionGuard {
    state: SessionState,
    loading: bool,
    directory: Arc<Directory>,
    store: Arc<dyn KeyValueStore>,
    policy: Arc<RoutingPolicy>,
    storage_key: String,
}

impl SessionGuard {
    #[must_use]
    pub fn new(directory: Arc<Directory>, store: Arc<dyn KeyValueStore>, policy: Arc<RoutingPolicy>) -> Self {
        Self {
            state: SessionState::Unauthenticated,
            loading: true,
            directory,
            store,
            policy,
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
        }
    }

    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn policy(&self) -> &RoutingPolicy {
        &self.policy
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            authenticated: self.state.is_authenticated(),
            loading: self.loading,
            role: self.state.role(),
            session: self.state.session().cloned(),
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        self.state = transition(&self.state, event);
    }

    /// Load the persisted session, if any. Corrupt records are deleted.
    pub async fn restore(&mut self) {
        let event = match self.store.get(&self.storage_key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => {
                    info!(user_id = %session.id, role = %session.role(), "session restored");
                    SessionEvent::Restored(session)
                }
                Err(e) => {
                    warn!(error = %e, "discarding unreadable session record");
                    if let Err(e) = self.store.delete(&self.storage_key).await {
                        warn!(error = %e, "failed to delete unreadable session record");
                    }
                    SessionEvent::RestoreEmpty
                }
            },
            Ok(None) => SessionEvent::RestoreEmpty,
            Err(e) => {
                warn!(error = %e, "session storage read failed");
                SessionEvent::RestoreEmpty
            }
        };

        self.apply(event);
        self.loading = false;
    }

    /// Settle a guard whose storage is known to hold no record, without
    /// reading it.
    pub fn start_empty(&mut self) {
        self.apply(SessionEvent::RestoreEmpty);
        self.loading = false;
    }

    /// Authenticate against the directory. Returns `false` on any mismatch
    /// and leaves the current state untouched.
    pub async fn login(&mut self, identifier: &str, secret: &str, persist: bool) -> bool {
        let Some(session) = self.directory.authenticate(identifier, secret) else {
            info!("login rejected");
            self.apply(SessionEvent::LoginRejected);
            return false;
        };

        if persist {
            match serde_json::to_string(&session) {
                Ok(raw) => {
                    if let Err(e) = self.store.set(&self.storage_key, &raw).await {
                        warn!(error = %e, user_id = %session.id, "session persist failed; keeping it in memory only");
                    }
                }
                Err(e) => warn!(error = %e, "session encode failed"),
            }
        } else if let Err(e) = self.store.delete(&self.storage_key).await {
            warn!(error = %e, "failed to clear stale session record");
        }

        info!(user_id = %session.id, role = %session.role(), persist, "login succeeded");
        self.apply(SessionEvent::LoggedIn(session));
        self.loading = false;
        true
    }

    /// Clear the session and its persisted record. Returns the path the
    /// caller must navigate to.
    pub async fn logout(&mut self) -> String {
        if let Some(session) = self.state.session() {
            info!(user_id = %session.id, "logout");
        }
        if let Err(e) = self.store.delete(&self.storage_key).await {
            warn!(error = %e, "failed to delete persisted session");
        }
        self.apply(SessionEvent::LoggedOut);
        self.policy.entry_path.clone()
    }

    /// Routing decision for `path` against the current state. Suppressed
    /// until the first `restore()` has completed.
    #[must_use]
    pub fn navigate(&self, path: &str) -> Option<String> {
        if self.is_loading() {
            return None;
        }
        self.policy.decide(self.state.role(), path)
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
