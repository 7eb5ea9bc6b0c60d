pub mod admin;
pub use self::admin::get_user;

pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::login;

pub mod logout;
pub use self::logout::logout;

pub mod me;
pub use self::me::me;

pub mod register;
pub use self::register::register;

pub mod types;

// common functions for the handlers
use axum::{
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::error;

use crate::{
    auth::{session_cookie, token::now_millis, AuthState, TokenPayload},
    store::CredentialRecord,
};
use types::MessageResponse;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration only insists on an `@`; deliverability is not checked.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    email.contains('@')
}

#[must_use]
pub fn valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
        .into_response()
}

pub fn internal_error() -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// Sign a fresh session for `record` and return the `Set-Cookie` header.
pub(crate) fn issue_session(state: &AuthState, record: &CredentialRecord) -> Result<HeaderMap, Response> {
    let payload = TokenPayload::new(
        record.identifier.clone(),
        record.role,
        state.config().session_ttl(),
    );
    let cookie = session_cookie(state.keys(), state.config(), &payload, now_millis()).map_err(|err| {
        error!("Failed to build session cookie: {err}");
        internal_error()
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok(headers)
}
