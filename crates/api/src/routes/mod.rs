//! API route definitions.

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::AppState;
use kassa_core::engine::EngineError;

pub mod accounts;
pub mod banks;
pub mod health;
pub mod users;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(banks::routes())
        .merge(users::routes())
        .merge(accounts::routes())
}

/// Maps a domain error onto its HTTP response.
///
/// Every [`EngineError`] variant carries its own status and stable error
/// code, so all handlers share this one translation. Server-side failures
/// are logged here; client errors answer quietly.
pub(crate) fn engine_error_response(err: &EngineError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %err, code = err.error_code(), "request failed");
    }
    (
        status,
        axum::Json(json!({
            "error": err.error_code(),
            "message": err.to_string(),
            "retryable": err.is_retryable(),
        })),
    )
        .into_response()
}
