//! Health check endpoint.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check handler. Answers 503 when the database is unreachable.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                version: env!("CARGO_PKG_VERSION"),
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded",
                version: env!("CARGO_PKG_VERSION"),
            }),
        ),
    }
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use kassa_core::currency::RateTable;
    use kassa_core::reports::{ReceiptWriter, StatementWriter};
    use sea_orm::DatabaseConnection;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn test_health_reports_degraded_without_database() {
        let state = AppState {
            db: Arc::new(DatabaseConnection::Disconnected),
            home_bank_id: 1,
            rates: RateTable::default(),
            lock_timeout: Duration::from_secs(1),
            receipts: Arc::new(ReceiptWriter::new("./target/test-checks")),
            statements: Arc::new(StatementWriter::new("./target/test-statements")),
        };
        let app = Router::new().merge(routes()).with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "degraded");
    }
}
