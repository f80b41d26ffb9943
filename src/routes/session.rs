//! Session routes — login, logout, reload, snapshot, routing decisions.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Json, Response};
use serde::{Deserialize, Serialize};

use super::client::ClientId;
use crate::session::{SessionGuard, SessionSnapshot};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub identifier: String,
    #[serde(alias = "password")]
    pub secret: String,
    /// "Remember me": persist the session across reloads.
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Where the client should navigate next, if anywhere.
    pub redirect: Option<String>,
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct RouteDecision {
    pub redirect: Option<String>,
}

fn error_body(message: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "error": message }))
}

/// Snapshot plus a redirect to the signed-in role's portal root.
fn portal_response(guard: &SessionGuard) -> SessionResponse {
    let redirect = guard
        .state()
        .role()
        .map(|role| guard.policy().portal_root(role).to_owned());
    SessionResponse { redirect, snapshot: guard.snapshot() }
}

/// `GET /api/session` — current session snapshot.
pub async fn current(State(state): State<AppState>, client: ClientId) -> Response {
    let snapshot = state
        .inspect(client.id, client.fresh, SessionGuard::snapshot)
        .await;
    client.attach(state.cookie_secure, Json(SessionResponse { redirect: None, snapshot }))
}

/// `POST /api/session/login` — match credentials and establish a session.
pub async fn login(State(state): State<AppState>, client: ClientId, Json(req): Json<LoginRequest>) -> Response {
    if req.identifier.trim().is_empty() || req.secret.is_empty() {
        return client.attach(
            state.cookie_secure,
            (StatusCode::BAD_REQUEST, error_body("identifier and secret are required")),
        );
    }

    // A new client is registered only once it holds a session.
    let (accepted, body) = if client.fresh {
        let mut guard = state.unregistered(client.id);
        let accepted = guard.login(&req.identifier, &req.secret, req.remember).await;
        let body = portal_response(&guard);
        if accepted {
            state.register(client.id, guard).await;
        }
        (accepted, body)
    } else {
        let slot = state.client(client.id).await;
        let mut guard = slot.guard.lock().await;
        let accepted = guard.login(&req.identifier, &req.secret, req.remember).await;
        (accepted, portal_response(&guard))
    };

    if !accepted {
        return client.attach(state.cookie_secure, (StatusCode::UNAUTHORIZED, error_body("invalid credentials")));
    }
    client.attach(state.cookie_secure, Json(body))
}

/// `POST /api/session/logout` — clear the session and its persisted record.
pub async fn logout(State(state): State<AppState>, client: ClientId) -> Response {
    let body = if client.fresh {
        let guard = state.unregistered(client.id);
        SessionResponse { redirect: Some(guard.policy().entry_path.clone()), snapshot: guard.snapshot() }
    } else {
        let slot = state.client(client.id).await;
        let mut guard = slot.guard.lock().await;
        let entry = guard.logout().await;
        SessionResponse { redirect: Some(entry), snapshot: guard.snapshot() }
    };
    client.attach(state.cookie_secure, Json(body))
}

/// `POST /api/session/reload` — discard the in-memory session and restore
/// from durable storage.
pub async fn reload(State(state): State<AppState>, client: ClientId) -> Response {
    let snapshot = if client.fresh {
        state.unregistered(client.id).snapshot()
    } else {
        let slot = state.reload_client(client.id).await;
        slot.guard.lock().await.snapshot()
    };
    client.attach(state.cookie_secure, Json(SessionResponse { redirect: None, snapshot }))
}

/// `GET /api/route?path=...` — routing decision without navigating.
pub async fn route_decision(
    State(state): State<AppState>,
    client: ClientId,
    Query(query): Query<RouteQuery>,
) -> Response {
    let redirect = state
        .inspect(client.id, client.fresh, |guard| guard.navigate(&query.path))
        .await;
    client.attach(state.cookie_secure, Json(RouteDecision { redirect }))
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
