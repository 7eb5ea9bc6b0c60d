use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::error;

use super::{
    internal_error,
    types::{MeResponse, UserResponse},
};
use crate::auth::{AuthState, MaybeSession};

#[utoipa::path(
    get,
    path= "/api/auth/me",
    responses (
        (status = 200, description = "Current user, or null when anonymous", body = MeResponse),
    ),
    tag= "auth"
)]
// axum handler for the current user
pub async fn me(state: Extension<Arc<AuthState>>, MaybeSession(session): MaybeSession) -> Response {
    let Some(session) = session else {
        return Json(MeResponse { user: None }).into_response();
    };

    // A valid token can outlive its account.
    match state.store().find_by_identifier(&session.identifier).await {
        Ok(record) => Json(MeResponse {
            user: record.as_ref().map(UserResponse::from),
        })
        .into_response(),
        Err(err) => {
            error!("Failed to lookup user by identifier: {err:#}");
            internal_error()
        }
    }
}
