//! Auth configuration and the shared, immutable auth context.

use std::{sync::Arc, time::Duration};
use url::Url;

use super::token::SessionKeys;
use crate::store::UserStore;

const DEFAULT_SESSION_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    public_url: String,
    session_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_URL.to_string())
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new(public_url: String) -> Self {
        Self {
            public_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }

    /// Only mark cookies secure when the site is served over HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        Url::parse(&self.public_url).is_ok_and(|url| url.scheme() == "https")
    }
}

/// Everything request handlers need to authenticate: config, signing keys,
/// and the user store. Built once at startup and shared behind an `Arc`.
pub struct AuthState {
    config: AuthConfig,
    keys: SessionKeys,
    store: Arc<dyn UserStore>,
}

impl AuthState {
    pub fn new(config: AuthConfig, keys: SessionKeys, store: Arc<dyn UserStore>) -> Self {
        Self {
            config,
            keys,
            store,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }
}
