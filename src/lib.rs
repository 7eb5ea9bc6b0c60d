//! # Career Board (job board backend)
//!
//! `career-board` serves the account side of a job board: registration, login,
//! logout, and the current-user lookup, plus an admin-only account lookup.
//!
//! ## Sessions
//!
//! Sessions are self-issued bearer tokens carried in an `HttpOnly` cookie named
//! `session`. A token is `base64url(json(payload)) "." base64url(hmac_sha256)`,
//! where the payload holds the account identifier, its role, and an absolute
//! expiry in epoch milliseconds. Nothing is stored server side, so logout only
//! clears the cookie and rotating the server secret invalidates every session.
//!
//! ## Passwords
//!
//! Passwords are hashed with Argon2id in raw mode under a per-account random
//! salt and compared in constant time. Logins for unknown emails still run one
//! derivation so response timing does not reveal which addresses exist.
//!
//! ## Gates
//!
//! Handlers declare their access requirements through extractors:
//! [`auth::MaybeSession`], [`auth::Session`], and [`auth::AdminSession`]. A
//! missing, tampered, or expired cookie is always the same `401`.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
