use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use super::{
    error_response, internal_error,
    types::{MessageResponse, UserResponse},
};
use crate::{
    auth::{AdminSession, AuthState},
    store::UserId,
};

#[utoipa::path(
    get,
    path= "/api/admin/users/{id}",
    params(
        ("id" = String, Path, description = "User identifier")
    ),
    responses (
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "No valid session", body = MessageResponse),
        (status = 403, description = "Session is not an admin", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
    ),
    tag= "admin"
)]
// axum handler for admin user lookup
pub async fn get_user(
    state: Extension<Arc<AuthState>>,
    AdminSession(admin): AdminSession,
    Path(id): Path<String>,
) -> Response {
    info!(admin = %admin.identifier, user = %id, "admin user lookup");

    match state.store().find_by_identifier(&UserId::from(id)).await {
        Ok(Some(record)) => Json(UserResponse::from(&record)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "User not found"),
        Err(err) => {
            error!("Failed to lookup user by identifier: {err:#}");
            internal_error()
        }
    }
}
