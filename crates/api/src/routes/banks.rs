//! Bank management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::engine_error_response;
use crate::AppState;
use kassa_core::engine::EngineError;
use kassa_db::entities::banks;
use kassa_db::repositories::{CreateBankInput, UpdateBankInput};
use kassa_shared::{PageRequest, PageResponse};

/// Creates the bank routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/banks", get(list_banks))
        .route("/banks", post(create_bank))
        .route("/banks/{id}", get(get_bank))
        .route("/banks/{id}", put(update_bank))
        .route("/banks/{id}", delete(delete_bank))
}

/// Request body for registering a bank.
#[derive(Debug, Deserialize)]
pub struct CreateBankRequest {
    /// Bank name.
    pub name: String,
}

/// Request body for updating a bank.
#[derive(Debug, Deserialize)]
pub struct UpdateBankRequest {
    /// New bank name.
    pub name: Option<String>,
}

/// Response for a bank.
#[derive(Debug, Serialize)]
pub struct BankResponse {
    /// Bank id.
    pub id: i64,
    /// Bank name.
    pub name: String,
    /// Whether the bank is active.
    pub active: bool,
}

impl From<banks::Model> for BankResponse {
    fn from(model: banks::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            active: model.active,
        }
    }
}

/// GET `/banks` - List active banks, paginated.
async fn list_banks(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    match state.bank_repository().list(&page).await {
        Ok((items, total)) => {
            let data: Vec<BankResponse> = items.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(PageResponse::new(data, &page, total))).into_response()
        }
        Err(err) => engine_error_response(&err),
    }
}

/// POST `/banks` - Register a bank.
async fn create_bank(
    State(state): State<AppState>,
    Json(payload): Json<CreateBankRequest>,
) -> impl IntoResponse {
    let input = CreateBankInput { name: payload.name };
    match state.bank_repository().create(input).await {
        Ok(bank) => (StatusCode::CREATED, Json(BankResponse::from(bank))).into_response(),
        Err(err) => engine_error_response(&err),
    }
}

/// GET `/banks/{id}` - Fetch one bank.
async fn get_bank(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.bank_repository().find_by_id(id).await {
        Ok(Some(bank)) => (StatusCode::OK, Json(BankResponse::from(bank))).into_response(),
        Ok(None) => engine_error_response(&EngineError::NotFound(format!("bank {id}"))),
        Err(err) => engine_error_response(&err),
    }
}

/// PUT `/banks/{id}` - Update a bank's name.
async fn update_bank(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateBankRequest>,
) -> impl IntoResponse {
    let input = UpdateBankInput { name: payload.name };
    match state.bank_repository().update(id, input).await {
        Ok(bank) => (StatusCode::OK, Json(BankResponse::from(bank))).into_response(),
        Err(err) => engine_error_response(&err),
    }
}

/// DELETE `/banks/{id}` - Soft-delete a bank and every account it holds.
///
/// The home bank refuses deletion.
async fn delete_bank(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.bank_repository().soft_delete(id).await {
        Ok(bank) => {
            info!(id, name = %bank.name, "bank deleted (deactivated)");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(err) => engine_error_response(&err),
    }
}
