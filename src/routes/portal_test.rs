use super::*;
use crate::state::test_helpers;
use axum::http::{StatusCode, header};
use uuid::Uuid;

fn uri(path: &str) -> Uri {
    path.parse().unwrap()
}

fn location(resp: &Response) -> Option<&str> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

async fn signed_in(state: &AppState, identifier: &str) -> ClientId {
    let client = ClientId { id: Uuid::new_v4(), fresh: false };
    let slot = state.client(client.id).await;
    assert!(slot.guard.lock().await.login(identifier, "password123", false).await);
    client
}

#[tokio::test]
async fn unauthenticated_portal_path_redirects_to_entry() {
    let state = test_helpers::test_app_state();
    let resp = navigate(State(state), ClientId::mint(), uri("/patient/records")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/"));
    assert!(resp.headers().get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn unauthenticated_entry_and_public_are_served() {
    let state = test_helpers::test_app_state();
    let client = ClientId { id: Uuid::new_v4(), fresh: false };

    for path in ["/", "/public/about"] {
        let resp = navigate(State(state.clone()), client, uri(path)).await;
        assert_eq!(resp.status(), StatusCode::OK, "path {path}");
    }
}

#[tokio::test]
async fn staff_on_patient_portal_redirects_to_staff_root() {
    let state = test_helpers::test_app_state();
    let client = signed_in(&state, "staff1@hospital.com").await;

    let resp = navigate(State(state), client, uri("/patient/telemedicine?room=3")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/hospital"));
}

#[tokio::test]
async fn signed_in_on_entry_redirects_to_own_root() {
    let state = test_helpers::test_app_state();
    let client = signed_in(&state, "patient1@email.com").await;

    let resp = navigate(State(state), client, uri("/")).await;
    assert_eq!(location(&resp), Some("/patient"));
}

#[tokio::test]
async fn own_portal_page_returns_envelope() {
    let state = test_helpers::test_app_state();
    let client = signed_in(&state, "patient1@email.com").await;

    let resp = navigate(State(state), client, uri("/patient/queue")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["path"], "/patient/queue");
    assert_eq!(body["session"]["role"], "patient");
    assert_eq!(body["session"]["session"]["name"], "John Smith");
}

#[tokio::test]
async fn cookieless_navigation_registers_no_client() {
    let state = test_helpers::test_app_state();
    for path in ["/", "/patient", "/public/about"] {
        for _ in 0..50 {
            let resp = navigate(State(state.clone()), ClientId::mint(), uri(path)).await;
            assert!(resp.headers().get(header::SET_COOKIE).is_some());
        }
    }
    assert!(state.clients.read().await.is_empty());
}
