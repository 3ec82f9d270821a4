//! Liveness endpoint.

use axum::http::StatusCode;

/// Returns 200 `OK` while the process is accepting connections.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
