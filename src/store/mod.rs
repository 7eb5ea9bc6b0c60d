//! User credential store.
//!
//! The session layer never writes here on its own: it reads password hashes to
//! verify logins and hands freshly hashed values to the store to persist.

mod memory;
mod postgres;
mod seed;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;
pub use seed::{seed_admin, SeedOutcome};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

use crate::auth::password::PasswordHash;

/// Closed set of account roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Opaque account handle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// A fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored account row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialRecord {
    pub identifier: UserId,
    pub email: String,
    pub role: Role,
    pub password: PasswordHash,
    pub created_at_unix_millis: i64,
}

/// Account data supplied on creation; the store assigns the identifier.
#[derive(Clone, Debug)]
pub struct NewCredential {
    pub email: String,
    pub role: Role,
    pub password: PasswordHash,
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(CredentialRecord),
    Conflict,
}

/// Normalize an email for lookup and uniqueness checks.
///
/// Applied both before writes and before reads; stores compare exactly.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_identifier(&self, identifier: &UserId) -> Result<Option<CredentialRecord>>;

    /// `email` must already be normalized.
    async fn find_by_normalized_email(&self, email: &str) -> Result<Option<CredentialRecord>>;

    async fn create(&self, credential: NewCredential) -> Result<CreateOutcome>;

    async fn update_password_hash(&self, identifier: &UserId, password: &PasswordHash) -> Result<()>;

    /// Cheap reachability probe used by `/health`.
    async fn ping(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::User, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&Role::Admin)?, "\"admin\"");
        assert_eq!(serde_json::from_str::<Role>("\"user\"")?, Role::User);
        Ok(())
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(UserId::generate(), UserId::generate());
    }
}
