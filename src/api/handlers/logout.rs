use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::error;

use super::types::MessageResponse;
use crate::auth::{clear_session_cookie, AuthState};

#[utoipa::path(
    post,
    path= "/api/auth/logout",
    responses (
        (status = 200, description = "Session cookie cleared", body = MessageResponse),
    ),
    tag= "auth"
)]
// axum handler for logout
pub async fn logout(state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Tokens are stateless; clearing the cookie is all there is to do.
    let mut headers = HeaderMap::new();
    match clear_session_cookie(state.config()) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build logout cookie: {err}"),
    }

    (
        StatusCode::OK,
        headers,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}
