//! Hermes webhook receiver.
//!
//! Binds an HTTP server with one POST route per configured provider and hands
//! every delivery to the shared [`dispatch::Dispatcher`].
//!
//! # Endpoints
//!
//! - `POST /github`, `POST /shortcut` (or whatever routes the providers name):
//!   webhook deliveries, answered `200 Received` once dispatched
//! - `GET /health`: liveness probe
//!
//! Any other method on a webhook route is answered `405 Method is not supported.`
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP framing and the mapping from
//! [`pipeline::IngestError`] to status codes live here. The dispatcher never
//! sees a request or a response.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use dispatch::Dispatcher;
use pipeline::ProviderConfig;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::{method_not_supported, webhook_handler, WebhookError, WebhookState};

/// Largest accepted webhook body. GitHub caps payloads at 25 MB.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Builds the router: `/health` plus one webhook route per provider.
pub fn build_router(dispatcher: Arc<Dispatcher>, providers: Vec<ProviderConfig>) -> Router {
    let mut router = Router::new().route("/health", get(health_handler));
    for provider in providers {
        let route = provider.route.clone();
        let state = WebhookState::new(Arc::clone(&dispatcher), provider);
        router = router.route(
            &route,
            post(webhook_handler)
                .fallback(method_not_supported)
                .with_state(state),
        );
    }
    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

/// Serves `router` on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening for webhooks");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(error) => {
            warn!(%error, "Unable to listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{HeaderValue, Request, StatusCode};
    use dispatch::testing::{FakeDirectory, FakeTracker, RecordingChat};
    use http_body_util::BodyExt;
    use pipeline::signature::{compute_signature, format_signature_header};
    use pipeline::{
        ChannelId, SignatureFormat, SignaturePolicy, SOURCE_CONTROL_EVENT_HEADER,
        SOURCE_CONTROL_SIGNATURE_HEADER, TRACKER_SIGNATURE_HEADER,
    };
    use secrecy::SecretString;
    use tower::ServiceExt;

    const SECRET: &str = "listener-secret";

    fn app(chat: Arc<RecordingChat>) -> Router {
        app_with_policy(chat, SignaturePolicy::Required)
    }

    fn app_with_policy(chat: Arc<RecordingChat>, policy: SignaturePolicy) -> Router {
        let dispatcher = Dispatcher::new(
            Arc::new(
                FakeTracker::new()
                    .with_member("m-1", "ada")
                    .with_story("42", "Login fails"),
            ),
            Arc::new(FakeDirectory::new()),
            chat,
            Duration::from_millis(500),
        );
        let providers = vec![
            ProviderConfig::source_control(
                SecretString::new(SECRET.into()),
                ChannelId::new("gh-channel").unwrap(),
            )
            .with_signature_policy(policy),
            ProviderConfig::tracker(
                SecretString::new(SECRET.into()),
                ChannelId::new("sc-channel").unwrap(),
            )
            .with_signature_policy(policy),
        ];
        build_router(Arc::new(dispatcher), providers)
    }

    fn push_body() -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "ref": "refs/heads/main",
            "repository": {"name": "hermes", "url": "https://github.com/acme/hermes"},
            "commits": [{
                "id": "0123456789abcdef",
                "message": "Fix typo",
                "url": "https://github.com/acme/hermes/commit/0123456",
                "author": {"name": "Ada", "username": "ada"}
            }]
        }))
        .unwrap()
    }

    fn github_request(body: Vec<u8>, signature: Option<String>, event: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/github")
            .header("content-type", "application/json")
            .header(SOURCE_CONTROL_EVENT_HEADER, event);
        if let Some(signature) = signature {
            builder = builder.header(SOURCE_CONTROL_SIGNATURE_HEADER, signature);
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn github_signature(body: &[u8]) -> String {
        format_signature_header(
            &compute_signature(body, SECRET.as_bytes()),
            SignatureFormat::Prefixed("sha256="),
        )
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = app(Arc::new(RecordingChat::new()))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn signed_push_is_received_and_delivered() {
        let chat = Arc::new(RecordingChat::new());
        let body = push_body();
        let signature = github_signature(&body);

        let response = app(chat.clone())
            .oneshot(github_request(body, Some(signature), "push"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Received");
        assert_eq!(chat.messages().len(), 1);
        assert!(chat.messages()[0].starts_with("ada pushed a new [commit]"));
        assert_eq!(chat.channels(), vec![ChannelId::new("gh-channel").unwrap()]);
    }

    #[tokio::test]
    async fn wrong_signature_is_unauthorized() {
        let chat = Arc::new(RecordingChat::new());
        let body = push_body();
        let forged = github_signature(b"something else");

        let response = app(chat.clone())
            .oneshot(github_request(body, Some(forged), "push"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, "Invalid signature");
        assert!(chat.messages().is_empty());
    }

    #[tokio::test]
    async fn unsigned_delivery_is_unauthorized_by_default() {
        let chat = Arc::new(RecordingChat::new());
        let response = app(chat.clone())
            .oneshot(github_request(push_body(), None, "push"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(chat.messages().is_empty());
    }

    #[tokio::test]
    async fn push_larger_than_axum_default_limit_is_delivered() {
        let chat = Arc::new(RecordingChat::new());
        let message = "x".repeat(3 * 1024 * 1024);
        let body = serde_json::to_vec(&serde_json::json!({
            "ref": "refs/heads/main",
            "repository": {"name": "hermes", "url": "https://github.com/acme/hermes"},
            "commits": [{
                "id": "0123456789abcdef",
                "message": message,
                "url": "https://github.com/acme/hermes/commit/0123456",
                "author": {"name": "Ada", "username": "ada"}
            }]
        }))
        .unwrap();
        assert!(body.len() > 2 * 1024 * 1024);
        let signature = github_signature(&body);

        let response = app(chat.clone())
            .oneshot(github_request(body, Some(signature), "push"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(chat.messages().len(), 1);
    }

    #[tokio::test]
    async fn non_ascii_signature_is_not_treated_as_absent() {
        let chat = Arc::new(RecordingChat::new());
        let request = Request::builder()
            .method("POST")
            .uri("/github")
            .header(SOURCE_CONTROL_EVENT_HEADER, "push")
            .header(
                SOURCE_CONTROL_SIGNATURE_HEADER,
                HeaderValue::from_bytes(b"sha256=\xff\xfe").unwrap(),
            )
            .body(Body::from(push_body()))
            .unwrap();

        let response = app_with_policy(chat.clone(), SignaturePolicy::AllowUnsigned)
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(chat.messages().is_empty());
    }

    #[tokio::test]
    async fn malformed_tracker_body_is_bad_request() {
        let chat = Arc::new(RecordingChat::new());
        let body = b"{not json".to_vec();
        let signature = format_signature_header(
            &compute_signature(&body, SECRET.as_bytes()),
            SignatureFormat::BareHex,
        );
        let request = Request::builder()
            .method("POST")
            .uri("/shortcut")
            .header(TRACKER_SIGNATURE_HEADER, signature)
            .body(Body::from(body))
            .unwrap();

        let response = app(chat.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.starts_with("Error parsing request body"));
        assert!(chat.messages().is_empty());
    }

    #[tokio::test]
    async fn non_push_event_is_received_without_message() {
        let chat = Arc::new(RecordingChat::new());
        let body =
            serde_json::to_vec(&serde_json::json!({"zen": "Keep it logically awesome."})).unwrap();
        let signature = github_signature(&body);

        let response = app(chat.clone())
            .oneshot(github_request(body, Some(signature), "ping"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(chat.messages().is_empty());
    }

    #[tokio::test]
    async fn get_on_webhook_route_is_method_not_allowed() {
        let response = app(Arc::new(RecordingChat::new()))
            .oneshot(Request::builder().uri("/shortcut").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_text(response).await, "Method is not supported.");
    }

    #[tokio::test]
    async fn unconfigured_route_is_not_found() {
        let response = app(Arc::new(RecordingChat::new()))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/gitlab")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
