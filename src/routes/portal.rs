//! Portal navigation — every non-API path goes through the routing policy.

use axum::extract::State;
use axum::http::Uri;
use axum::response::{Json, Redirect, Response};
use serde::Serialize;

use super::client::ClientId;
use crate::session::SessionSnapshot;
use crate::state::AppState;

/// Body returned for an allowed navigation. Rendering is left to the client.
#[derive(Debug, Serialize)]
pub struct PageEnvelope {
    pub path: String,
    pub session: SessionSnapshot,
}

/// Fallback handler: redirect per policy or answer with the page envelope.
pub async fn navigate(State(state): State<AppState>, client: ClientId, uri: Uri) -> Response {
    let path = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_owned(), |pq| pq.as_str().to_owned());

    let (redirect, snapshot) = state
        .inspect(client.id, client.fresh, |guard| (guard.navigate(&path), guard.snapshot()))
        .await;

    if let Some(target) = redirect {
        tracing::debug!(from = %uri.path(), to = %target, "navigation redirected");
        return client.attach(state.cookie_secure, Redirect::to(&target));
    }

    let envelope = PageEnvelope { path: uri.path().to_owned(), session: snapshot };
    client.attach(state.cookie_secure, Json(envelope))
}

#[cfg(test)]
#[path = "portal_test.rs"]
mod tests;
