//! Request gates.
//!
//! Each request resolves its session once: either `Anonymous` or
//! `Authenticated(payload)`. Handlers receive the outcome as a typed extractor
//! instead of reading it back from request extensions.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

use super::{cookie::current_session, state::AuthState, token::TokenPayload};
use crate::store::Role;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateRejection {
    Unauthorized,
    Forbidden,
}

impl GateRejection {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.message() }))).into_response()
    }
}

/// Authentication gate.
///
/// # Errors
/// `Unauthorized` when `required` and the request has no valid session.
pub fn authenticate(
    state: &AuthState,
    headers: &HeaderMap,
    required: bool,
) -> Result<Option<TokenPayload>, GateRejection> {
    match current_session(state, headers) {
        Some(payload) => Ok(Some(payload)),
        None if required => Err(GateRejection::Unauthorized),
        None => Ok(None),
    }
}

/// Role gate. Runs after [`authenticate`].
///
/// # Errors
/// `Forbidden` when there is no session or its role differs from `role`.
pub fn require_role(
    session: Option<&TokenPayload>,
    role: Role,
) -> Result<&TokenPayload, GateRejection> {
    match session {
        Some(payload) if payload.role == role => Ok(payload),
        Some(payload) => {
            warn!(
                identifier = %payload.identifier,
                role = %payload.role,
                required = %role,
                "role gate rejected session"
            );
            Err(GateRejection::Forbidden)
        }
        None => Err(GateRejection::Forbidden),
    }
}

fn auth_state(parts: &Parts) -> Result<Arc<AuthState>, Response> {
    parts.extensions.get::<Arc<AuthState>>().cloned().ok_or_else(|| {
        error!("AuthState extension missing from router");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Internal server error" })),
        )
            .into_response()
    })
}

/// Optional gate: the session if there is a valid one.
#[derive(Clone, Debug)]
pub struct MaybeSession(pub Option<TokenPayload>);

/// Required gate: a verified session.
#[derive(Clone, Debug)]
pub struct Session(pub TokenPayload);

/// Required gate followed by the `Admin` role gate.
#[derive(Clone, Debug)]
pub struct AdminSession(pub TokenPayload);

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = auth_state(parts)?;
        let session =
            authenticate(&state, &parts.headers, false).map_err(IntoResponse::into_response)?;
        Ok(Self(session))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = auth_state(parts)?;
        match authenticate(&state, &parts.headers, true) {
            Ok(Some(payload)) => Ok(Self(payload)),
            Ok(None) | Err(_) => Err(GateRejection::Unauthorized.into_response()),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Session(payload) = Session::from_request_parts(parts, state).await?;
        require_role(Some(&payload), Role::Admin).map_err(IntoResponse::into_response)?;
        Ok(Self(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{state::AuthConfig, token::SessionKeys},
        store::{MemoryUserStore, UserId},
    };
    use axum::http::{header::COOKIE, HeaderValue};
    use secrecy::SecretString;
    use std::time::Duration;

    fn state() -> AuthState {
        AuthState::new(
            AuthConfig::default(),
            SessionKeys::new(SecretString::from("gate-test-secret-0123456789abcdef")),
            Arc::new(MemoryUserStore::new()),
        )
    }

    fn headers_for(state: &AuthState, payload: &TokenPayload) -> anyhow::Result<HeaderMap> {
        let token = state.keys().sign(payload)?;
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&format!("session={token}"))?);
        Ok(headers)
    }

    fn payload(role: Role) -> TokenPayload {
        TokenPayload::new(UserId::from("user-1"), role, Duration::from_secs(60))
    }

    #[test]
    fn anonymous_requests() {
        let state = state();
        let headers = HeaderMap::new();
        assert_eq!(authenticate(&state, &headers, false), Ok(None));
        assert_eq!(
            authenticate(&state, &headers, true),
            Err(GateRejection::Unauthorized)
        );
    }

    #[test]
    fn authenticated_requests() -> anyhow::Result<()> {
        let state = state();
        let payload = payload(Role::User);
        let headers = headers_for(&state, &payload)?;
        assert_eq!(authenticate(&state, &headers, true), Ok(Some(payload.clone())));
        assert_eq!(authenticate(&state, &headers, false), Ok(Some(payload)));
        Ok(())
    }

    #[test]
    fn expired_session_is_unauthorized() -> anyhow::Result<()> {
        let state = state();
        let expired = TokenPayload::new(UserId::from("user-1"), Role::Admin, Duration::ZERO);
        let headers = headers_for(&state, &expired)?;
        assert_eq!(
            authenticate(&state, &headers, true),
            Err(GateRejection::Unauthorized)
        );
        Ok(())
    }

    #[test]
    fn role_gate() {
        let admin = payload(Role::Admin);
        let user = payload(Role::User);
        assert_eq!(require_role(Some(&admin), Role::Admin), Ok(&admin));
        assert_eq!(require_role(Some(&user), Role::User), Ok(&user));
        assert_eq!(
            require_role(Some(&user), Role::Admin),
            Err(GateRejection::Forbidden)
        );
        assert_eq!(require_role(None, Role::Admin), Err(GateRejection::Forbidden));
    }

    #[test]
    fn rejections_render_generic_messages() {
        assert_eq!(GateRejection::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(GateRejection::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(GateRejection::Unauthorized.message(), "Unauthorized");
        assert_eq!(GateRejection::Forbidden.message(), "Forbidden");
    }
}
