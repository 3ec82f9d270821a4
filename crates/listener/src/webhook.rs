//! Webhook endpoint handler.
//!
//! One instance of [`webhook_handler`] is mounted per configured provider.
//! The raw body is read in full and handed to the dispatcher untouched, so the
//! signature is always checked against the exact wire bytes.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use dispatch::Dispatcher;
use pipeline::{IngestError, ProviderConfig, WebhookEnvelope};
use thiserror::Error;
use tracing::{debug, warn};

/// Per-route state: the shared dispatcher plus the provider the route serves.
#[derive(Clone)]
pub struct WebhookState {
    dispatcher: Arc<Dispatcher>,
    provider: Arc<ProviderConfig>,
}

impl WebhookState {
    pub fn new(dispatcher: Arc<Dispatcher>, provider: ProviderConfig) -> Self {
        Self {
            dispatcher,
            provider: Arc::new(provider),
        }
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }
}

/// Reasons a webhook request is answered with something other than 200.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Error reading request body")]
    UnreadableBody(#[source] BytesRejection),

    #[error(transparent)]
    Rejected(#[from] IngestError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::UnreadableBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebhookError::Rejected(IngestError::Unauthorized)
            | WebhookError::Rejected(IngestError::MissingSignature { .. }) => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::Rejected(IngestError::MalformedPayload(_)) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// Accepts one provider delivery.
///
/// # Response
///
/// - 200 `Received`: accepted, whether or not any message was sent
/// - 400: body is not JSON
/// - 401: signature missing (when required) or wrong
/// - 500: body could not be read
pub async fn webhook_handler(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let body = body.map_err(|rejection| {
        warn!(provider = %state.provider.kind, error = %rejection, "Failed to read webhook body");
        WebhookError::UnreadableBody(rejection)
    })?;

    let provider = state.provider();
    let signature = signature_value(&headers, provider.signature_header);
    let event_type = provider
        .event_type_header
        .and_then(|name| header_value(&headers, name));
    debug!(
        provider = %provider.kind,
        route = %provider.route,
        event_type = event_type.as_deref().unwrap_or(""),
        "Received webhook"
    );

    let envelope = WebhookEnvelope::new(body.to_vec(), signature, event_type);
    let report = state.dispatcher.dispatch(provider, &envelope).await?;
    debug!(
        delivery_id = %report.delivery_id,
        delivered = report.delivered,
        suppressed = report.suppressed,
        failed = report.failed,
        "Webhook handled"
    );
    Ok((StatusCode::OK, "Received"))
}

/// Answers any method other than POST on a webhook route.
pub async fn method_not_supported() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method is not supported.")
}

/// A present but non-ASCII signature still counts as a claim, so it fails
/// verification rather than passing as unsigned.
fn signature_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
