//! Binding between session tokens and the `session` cookie.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

use super::{
    error::TokenError,
    state::{AuthConfig, AuthState},
    token::{SessionKeys, TokenPayload},
};

pub const SESSION_COOKIE_NAME: &str = "session";

#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("invalid cookie header: {0}")]
    Header(#[from] InvalidHeaderValue),
}

/// Sign `payload` and build a `Set-Cookie` value that expires with it.
///
/// # Errors
/// Fails when the payload cannot be signed or the header cannot be built.
pub fn session_cookie(
    keys: &SessionKeys,
    config: &AuthConfig,
    payload: &TokenPayload,
    now_millis: i64,
) -> Result<HeaderValue, CookieError> {
    let token = keys.sign(payload)?;
    let max_age = payload
        .expires_at_epoch_millis
        .saturating_sub(now_millis)
        .max(0)
        / 1000;
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    );
    // Only mark cookies secure when the site is served over HTTPS.
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    Ok(HeaderValue::from_str(&cookie)?)
}

/// Expire the session cookie on the client.
///
/// # Errors
/// Fails only if the header value cannot be built.
pub fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Split a `Cookie` header into name/value pairs.
///
/// Segments without `=` or with an empty name are skipped.
#[must_use]
pub fn parse_cookies(header: &str) -> Vec<(&str, &str)> {
    header
        .split(';')
        .filter_map(|segment| {
            let (name, value) = segment.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|inner| inner.strip_suffix('"'))
                .unwrap_or(value);
            Some((name, value))
        })
        .collect()
}

/// Raw token from the first `session` cookie across all `Cookie` headers.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| {
            parse_cookies(header)
                .into_iter()
                .find(|(name, _)| *name == SESSION_COOKIE_NAME)
                .map(|(_, value)| value)
        })
}

/// Resolve the request's session, if it carries a valid one.
///
/// Missing, unreadable, and invalid cookies all look the same to callers.
#[must_use]
pub fn current_session(state: &AuthState, headers: &HeaderMap) -> Option<TokenPayload> {
    let token = session_token(headers)?;
    state.keys().verify(token)
}
