use crate::{
    api,
    auth::{resolve_session_secret, AuthConfig, AuthState, Environment, SessionKeys},
    cli::telemetry,
    store::{seed_admin, MemoryUserStore, PgUserStore, SeedOutcome, UserStore},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fallback admin password outside production.
const DEV_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub public_url: String,
    pub session_secret: Option<SecretString>,
    pub session_ttl_seconds: u64,
    pub environment: Environment,
    pub admin_email: String,
    pub admin_password: Option<SecretString>,
}

/// Pick the admin password to seed with, if any.
fn admin_password(
    configured: Option<SecretString>,
    environment: Environment,
) -> Option<SecretString> {
    match (configured, environment) {
        (Some(password), _) => Some(password),
        (None, Environment::Development) => {
            warn!("no admin password configured, seeding the admin account with the development default");
            Some(SecretString::from(DEV_ADMIN_PASSWORD))
        }
        (None, Environment::Production) => {
            warn!("no admin password configured, skipping admin seeding");
            None
        }
    }
}

async fn user_store(dsn: Option<String>) -> Result<Arc<dyn UserStore>> {
    if let Some(dsn) = dsn {
        let store = PgUserStore::new(dsn);
        // Connect now so a bad DSN fails startup instead of the first request.
        store.ping().await.context("Failed to connect to database")?;
        info!("Using Postgres user store");
        Ok(Arc::new(store))
    } else {
        warn!("no DSN configured, accounts are kept in memory and lost on restart");
        Ok(Arc::new(MemoryUserStore::new()))
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the session secret is unusable, the store is
/// unreachable, admin seeding fails, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!(environment = %args.environment, "starting server");

    let secret = resolve_session_secret(args.session_secret, args.environment)?;

    let config =
        AuthConfig::new(args.public_url).with_session_ttl_seconds(args.session_ttl_seconds);
    if args.environment == Environment::Production && !config.session_cookie_secure() {
        warn!(
            public_url = config.public_url(),
            "public URL is not https, session cookies will not be marked Secure"
        );
    }

    let store = user_store(args.dsn).await?;

    if let Some(password) = admin_password(args.admin_password, args.environment) {
        match seed_admin(store.as_ref(), &args.admin_email, &password)
            .await
            .context("Failed to seed admin account")?
        {
            SeedOutcome::Created | SeedOutcome::PasswordReset => {}
            SeedOutcome::Unchanged => debug!("admin account already up to date"),
        }
    }

    let state = Arc::new(AuthState::new(config, SessionKeys::new(secret), store));

    let result = api::new(args.port, state).await;

    telemetry::shutdown_tracer();

    result
}
