//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Session API endpoints live under `/api/session`; every other path is a
//! portal navigation that passes through the client's session guard and is
//! either redirected or answered with a JSON page envelope.

pub mod client;
pub mod portal;
pub mod session;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/session", get(session::current))
        .route("/api/session/login", post(session::login))
        .route("/api/session/logout", post(session::logout))
        .route("/api/session/reload", post(session::reload))
        .route("/api/route", get(session::route_decision))
        .route("/healthz", get(healthz))
        .fallback(portal::navigate)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
