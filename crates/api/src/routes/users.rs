//! Client management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::engine_error_response;
use crate::AppState;
use kassa_core::engine::EngineError;
use kassa_db::entities::users;
use kassa_db::repositories::{CreateUserInput, UpdateUserInput};
use kassa_shared::{PageRequest, PageResponse};

/// Creates the client routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}", put(update_user))
        .route("/users/{id}", delete(delete_user))
}

/// Request body for registering a client.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Birthdate (YYYY-MM-DD).
    pub birthdate: NaiveDate,
}

/// Request body for updating a client.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    /// New given name.
    pub name: Option<String>,
    /// New family name.
    pub surname: Option<String>,
    /// New birthdate (YYYY-MM-DD).
    pub birthdate: Option<NaiveDate>,
}

/// Response for a client.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User id.
    pub id: i64,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Birthdate.
    pub birthdate: NaiveDate,
    /// Whether the client is active.
    pub active: bool,
}

impl From<users::Model> for UserResponse {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            surname: model.surname,
            birthdate: model.birthdate,
            active: model.active,
        }
    }
}

/// GET `/users` - List active clients, paginated.
async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    match state.user_repository().list(&page).await {
        Ok((items, total)) => {
            let data: Vec<UserResponse> = items.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(PageResponse::new(data, &page, total))).into_response()
        }
        Err(err) => engine_error_response(&err),
    }
}

/// POST `/users` - Register a client.
async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> impl IntoResponse {
    let input = CreateUserInput {
        name: payload.name,
        surname: payload.surname,
        birthdate: payload.birthdate,
    };
    match state.user_repository().create(input).await {
        Ok(user) => (StatusCode::CREATED, Json(UserResponse::from(user))).into_response(),
        Err(err) => engine_error_response(&err),
    }
}

/// GET `/users/{id}` - Fetch one client.
async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.user_repository().find_by_id(id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(UserResponse::from(user))).into_response(),
        Ok(None) => engine_error_response(&EngineError::NotFound(format!("user {id}"))),
        Err(err) => engine_error_response(&err),
    }
}

/// PUT `/users/{id}` - Update a client's details.
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    let input = UpdateUserInput {
        name: payload.name,
        surname: payload.surname,
        birthdate: payload.birthdate,
    };
    match state.user_repository().update(id, input).await {
        Ok(user) => (StatusCode::OK, Json(UserResponse::from(user))).into_response(),
        Err(err) => engine_error_response(&err),
    }
}

/// DELETE `/users/{id}` - Soft-delete a client and the client's home-bank
/// accounts. Accounts the client holds at other banks are left alone.
async fn delete_user(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.user_repository().soft_delete(id).await {
        Ok(user) => {
            info!(id, name = %user.name, surname = %user.surname, "client deleted (deactivated)");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(err) => engine_error_response(&err),
    }
}
