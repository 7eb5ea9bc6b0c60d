use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::{
    error_response, internal_error, issue_session,
    types::{Credentials, MessageResponse, UserResponse},
    valid_email, valid_password,
};
use crate::{
    auth::{password::hash_password, AuthState},
    store::{normalize_email, CreateOutcome, NewCredential, Role},
};

#[utoipa::path(
    post,
    path= "/api/auth/register",
    request_body = Credentials,
    responses (
        (status = 201, description = "Registration successful, session cookie set", body = UserResponse, content_type = "application/json"),
        (status = 400, description = "Missing or invalid email or password", body = MessageResponse),
        (status = 409, description = "Email is already registered", body = MessageResponse),
    ),
    tag= "auth"
)]
// axum handler for register
#[instrument(skip(state, payload))]
pub async fn register(
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
    if !valid_email(&email) {
        return error_response(StatusCode::BAD_REQUEST, "A valid email address is required");
    }
    if !valid_password(&credentials.password) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters",
        );
    }

    // Skip the KDF when the address is obviously taken; `create` still guards the race.
    match state.store().find_by_normalized_email(&email).await {
        Ok(Some(_)) => {
            return error_response(StatusCode::CONFLICT, "Email is already registered");
        }
        Ok(None) => {}
        Err(err) => {
            error!("Failed to lookup user by email: {err:#}");
            return internal_error();
        }
    }

    let password = credentials.password;
    let hashed = match tokio::task::spawn_blocking(move || hash_password(&password, None)).await {
        Ok(Ok(hashed)) => hashed,
        Ok(Err(err)) => {
            error!("Failed to hash password: {err}");
            return internal_error();
        }
        Err(err) => {
            error!("Password hashing task failed: {err}");
            return internal_error();
        }
    };

    let outcome = state
        .store()
        .create(NewCredential {
            email,
            role: Role::User,
            password: hashed,
        })
        .await;

    let record = match outcome {
        Ok(CreateOutcome::Created(record)) => record,
        Ok(CreateOutcome::Conflict) => {
            return error_response(StatusCode::CONFLICT, "Email is already registered");
        }
        Err(err) => {
            error!("Failed to create user: {err:#}");
            return internal_error();
        }
    };

    info!(identifier = %record.identifier, "registered user");

    match issue_session(&state, &record) {
        Ok(headers) => (
            StatusCode::CREATED,
            headers,
            Json(UserResponse::from(&record)),
        )
            .into_response(),
        Err(response) => response,
    }
}
