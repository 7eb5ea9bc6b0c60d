use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{
    error_response, internal_error, issue_session,
    types::{Credentials, MessageResponse, UserResponse},
};
use crate::{
    auth::{
        password::{dummy_verify, verify_password},
        AuthState,
    },
    store::normalize_email,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[utoipa::path(
    post,
    path= "/api/auth/login",
    request_body = Credentials,
    responses (
        (status = 200, description = "Login successful, session cookie set", body = UserResponse, content_type = "application/json"),
        (status = 400, description = "Missing email or password", body = MessageResponse),
        (status = 401, description = "Invalid email or password", body = MessageResponse),
    ),
    tag= "auth"
)]
// axum handler for login
#[instrument(skip(state, payload))]
pub async fn login(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<Credentials>>,
) -> Response {
    let Some(Json(credentials)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Email and password are required");
    };
    if credentials.email.is_empty() || credentials.password.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Email and password are required");
    }

    let email = normalize_email(&credentials.email);
    let record = match state.store().find_by_normalized_email(&email).await {
        Ok(record) => record,
        Err(err) => {
            error!("Failed to lookup user by email: {err:#}");
            return internal_error();
        }
    };

    // Unknown emails still pay for one derivation so timing does not reveal
    // which addresses are registered.
    let password = credentials.password;
    let check = match record.clone() {
        Some(record) => {
            tokio::task::spawn_blocking(move || {
                verify_password(&password, &record.password.salt, &record.password.hash)
            })
            .await
        }
        None => {
            tokio::task::spawn_blocking(move || {
                dummy_verify(&password);
                false
            })
            .await
        }
    };

    let valid = match check {
        Ok(valid) => valid,
        Err(err) => {
            error!("Password verification task failed: {err}");
            return internal_error();
        }
    };

    let Some(record) = record.filter(|_| valid) else {
        debug!("login rejected");
        return error_response(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS);
    };

    match issue_session(&state, &record) {
        Ok(headers) => (StatusCode::OK, headers, Json(UserResponse::from(&record))).into_response(),
        Err(response) => response,
    }
}
