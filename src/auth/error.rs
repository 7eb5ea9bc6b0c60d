use thiserror::Error;

/// Reasons a session token is rejected.
///
/// These never leave the auth module: callers only see `None`, the variant is
/// logged so operators can tell tampering from plain expiry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed session token")]
    Malformed,
    #[error("session token signature mismatch")]
    SignatureMismatch,
    #[error("session token expired")]
    Expired,
    #[error("failed to encode session token: {0}")]
    Encode(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    HashingFailure(String),
}
