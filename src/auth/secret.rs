//! Server secret resolution.
//!
//! The secret is read once at startup and never changes while the process
//! runs. Rotating it logs every user out.

use anyhow::{anyhow, Result};
use secrecy::{ExposeSecret, SecretString};
use std::{fmt, str::FromStr};
use tracing::warn;

/// Well-known fallback for local development. Rejected in production.
pub const DEV_SESSION_SECRET: &str = "dev-secret-change-me";

const RECOMMENDED_SECRET_LEN: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Decide which HMAC key the process signs sessions with.
///
/// # Errors
/// Fails when the secret is present but blank, missing in production, or the
/// development default in production.
pub fn resolve_session_secret(
    provided: Option<SecretString>,
    environment: Environment,
) -> Result<SecretString> {
    let Some(secret) = provided else {
        return match environment {
            Environment::Production => Err(anyhow!(
                "session secret is required in production (set CAREER_BOARD_SESSION_SECRET)"
            )),
            Environment::Development => {
                warn!(
                    "no session secret configured, using the well-known development secret; \
                     sessions can be forged by anyone, never deploy like this"
                );
                Ok(SecretString::from(DEV_SESSION_SECRET))
            }
        };
    };

    let value = secret.expose_secret();
    if value.trim().is_empty() {
        return Err(anyhow!("session secret must not be empty"));
    }

    if value == DEV_SESSION_SECRET {
        if environment == Environment::Production {
            return Err(anyhow!(
                "the development session secret cannot be used in production"
            ));
        }
        warn!("session secret is the well-known development secret");
    } else if value.len() < RECOMMENDED_SECRET_LEN {
        warn!(
            "session secret is shorter than {} bytes, consider a longer random value",
            RECOMMENDED_SECRET_LEN
        );
    }

    Ok(secret)
}
