//! Integration tests for the chat REST surface.
//!
//! Drives the axum router directly with `tower::ServiceExt::oneshot`
//! against the in-memory store, covering auth, posting, history, and
//! error mapping.

use std::sync::Arc;

use axum::body::Body;
use axum::{middleware, Router};
use http::{header, Request, StatusCode};
use tower::ServiceExt;

use pulse_chat::adapters::auth::MockTokenValidator;
use pulse_chat::adapters::http::chat::chat_router;
use pulse_chat::adapters::http::middleware::{auth_middleware, AuthState};
use pulse_chat::adapters::http::ChatAppState;
use pulse_chat::adapters::memory::InMemoryChatStore;
use pulse_chat::application::PostMessageHandler;
use pulse_chat::domain::chat::ChannelName;
use pulse_chat::domain::foundation::ChannelId;
use pulse_chat::ports::{ChatDirectory, MessageIngestion, TokenValidator};
use pulse_chat::realtime::{Broadcaster, ChannelRegistry, QueueItem};

const ALICE_TOKEN: &str = "alice-token";

struct TestServer {
    app: Router,
    registry: Arc<ChannelRegistry>,
    store: Arc<InMemoryChatStore>,
}

fn test_server() -> TestServer {
    let registry = Arc::new(ChannelRegistry::new());
    let store = Arc::new(InMemoryChatStore::new());

    let ingestion: Arc<dyn MessageIngestion> = store.clone();
    let directory: Arc<dyn ChatDirectory> = store.clone();
    let post_message = Arc::new(PostMessageHandler::new(
        ingestion,
        Broadcaster::new(Arc::clone(&registry)),
    ));

    let validator: Arc<dyn TokenValidator> =
        Arc::new(MockTokenValidator::new().with_token(ALICE_TOKEN, "alice"));
    let auth_state: AuthState = validator;

    let app = chat_router()
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(ChatAppState::new(directory, post_message, 50));

    TestServer {
        app,
        registry,
        store,
    }
}

async fn seed_channel(server: &TestServer, name: &str) -> ChannelId {
    server
        .store
        .create_channel(ChannelName::new(name).unwrap())
        .await
        .unwrap()
        .id
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn guest_endpoint_issues_prefixed_identity() {
    let server = test_server();

    let response = server.app.oneshot(get_request("/api/guest")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let guest_id = body["guest_id"].as_str().unwrap();
    assert!(guest_id.starts_with("guest_"));
}

#[tokio::test]
async fn channel_creation_requires_authentication() {
    let server = test_server();

    let response = server
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/channels",
            serde_json::json!({"name": "Plans"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut request = json_request(
        "POST",
        "/api/channels",
        serde_json::json!({"name": "Plans"}),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {ALICE_TOKEN}").parse().unwrap(),
    );
    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["name"], "Plans");

    // And it shows up in the listing.
    let response = server
        .app
        .oneshot(get_request("/api/channels"))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_bearer_token_is_rejected() {
    let server = test_server();

    let mut request = get_request("/api/channels");
    request.headers_mut().insert(
        header::AUTHORIZATION,
        "Bearer not-a-real-token".parse().unwrap(),
    );
    let response = server.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(response).await;
    assert_eq!(body["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn posting_to_unknown_channel_is_404() {
    let server = test_server();

    let response = server
        .app
        .oneshot(json_request(
            "POST",
            "/api/channels/42/messages",
            serde_json::json!({"content": "anyone home?"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(body["code"], "CHANNEL_NOT_FOUND");
}

#[tokio::test]
async fn posting_blank_content_is_422() {
    let server = test_server();
    let channel = seed_channel(&server, "General").await;

    let response = server
        .app
        .oneshot(json_request(
            "POST",
            &format!("/api/channels/{channel}/messages"),
            serde_json::json!({"content": "   "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn guest_post_is_stored_delivered_and_served_as_history() {
    let server = test_server();
    let channel = seed_channel(&server, "General").await;

    let mut subscriber = server.registry.register(channel).await;

    let response = server
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/channels/{channel}/messages"),
            serde_json::json!({"content": "hi all", "guest_id": "guest_12ab34cd"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["sender"], "guest_12ab34cd");
    assert_eq!(body["content"], "hi all");

    // The live subscriber got the same event.
    match subscriber.next().await {
        QueueItem::Event(event) => {
            assert_eq!(event.sender, "guest_12ab34cd");
            assert_eq!(event.content, "hi all");
        }
        QueueItem::Shutdown => panic!("expected event"),
    }

    // So does the history read path.
    let response = server
        .app
        .oneshot(get_request(&format!("/api/channels/{channel}/messages")))
        .await
        .unwrap();
    let body = response_json(response).await;
    let history = body.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["sender"], "guest_12ab34cd");
}

#[tokio::test]
async fn anonymous_flag_hides_the_authenticated_sender() {
    let server = test_server();
    let channel = seed_channel(&server, "General").await;

    let mut request = json_request(
        "POST",
        &format!("/api/channels/{channel}/messages"),
        serde_json::json!({"content": "no names", "anonymous": true}),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {ALICE_TOKEN}").parse().unwrap(),
    );

    let response = server.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["sender"], "Anonymous");
}

#[tokio::test]
async fn history_respects_limit_parameter() {
    let server = test_server();
    let channel = seed_channel(&server, "General").await;

    for i in 1..=5 {
        let response = server
            .app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/channels/{channel}/messages"),
                serde_json::json!({"content": format!("message {i}")}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = server
        .app
        .oneshot(get_request(&format!(
            "/api/channels/{channel}/messages?limit=2"
        )))
        .await
        .unwrap();
    let body = response_json(response).await;
    let history = body.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["content"], "message 4");
    assert_eq!(history[1]["content"], "message 5");
}

#[tokio::test]
async fn history_for_unknown_channel_is_404() {
    let server = test_server();

    let response = server
        .app
        .oneshot(get_request("/api/channels/42/messages"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
