//! Router tests
//!
//! Exercise the HTTP surface through `tower::ServiceExt::oneshot` without
//! binding a socket.

mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use tempfile::TempDir;
use tower::util::ServiceExt;

use callbridge_gateway::routes;

use common::{ChannelConnector, config_for, state_with};

fn router() -> (axum::Router, std::sync::Arc<callbridge_gateway::AppState>, TempDir) {
    let dir = TempDir::new().unwrap();
    let (connector, _peers) = ChannelConnector::new();
    let state = state_with(config_for("http://127.0.0.1:9", dir.path()), connector);
    (routes::create_router(state.clone()), state, dir)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _state, _dir) = router();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body, serde_json::json!({"status": "OK"}));
}

#[tokio::test]
async fn test_incoming_call_form_post() {
    let (app, state, _dir) = router();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/incoming-call")
                .header(header::HOST, "bridge.example.com")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("CallSid=CA42&From=%2B15551234&To=%2B15550000"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/xml"
    );

    let xml = body_string(response).await;
    assert!(xml.contains("Thank you for calling."));
    assert!(xml.contains(r#"<Pause length="1"/>"#));
    assert!(xml.contains(r#"<Stream url="wss://bridge.example.com/media-stream"/>"#));

    assert_eq!(
        state.store.callers.take_pending("CA42").as_deref(),
        Some("+15551234")
    );
}

#[tokio::test]
async fn test_incoming_call_query_defaults_caller() {
    let (app, state, _dir) = router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/incoming-call?CallSid=CA43")
                .header(header::HOST, "bridge.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        state.store.callers.take_pending("CA43").as_deref(),
        Some("Unknown")
    );
}

#[tokio::test]
async fn test_media_stream_requires_upgrade() {
    let (app, _state, _dir) = router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/media-stream")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _state, _dir) = router();

    let response = app
        .oneshot(Request::builder().uri("/voices").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
