//! Startup seeding of the admin account.

use anyhow::{anyhow, bail, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info};

use super::{normalize_email, CreateOutcome, NewCredential, Role, UserStore};
use crate::auth::password::{hash_password, verify_password, PasswordHash};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    PasswordReset,
    Unchanged,
}

async fn hash_blocking(password: &SecretString) -> Result<PasswordHash> {
    let password = password.clone();
    tokio::task::spawn_blocking(move || hash_password(password.expose_secret(), None))
        .await
        .context("password hashing task failed")?
        .map_err(|err| anyhow!(err))
}

/// Make sure `email` exists as an admin whose password matches `password`.
///
/// An existing admin keeps its identifier; only a stale hash is replaced, with
/// a fresh salt. A non-admin account registered under `email` is never
/// promoted or touched.
///
/// # Errors
/// Returns an error if `email` belongs to a non-admin account, the store
/// fails, or the password cannot be hashed.
pub async fn seed_admin(
    store: &dyn UserStore,
    email: &str,
    password: &SecretString,
) -> Result<SeedOutcome> {
    let email = normalize_email(email);

    if let Some(existing) = store.find_by_normalized_email(&email).await? {
        if existing.role != Role::Admin {
            error!(email = %email, role = %existing.role, "admin email belongs to a non-admin account");
            bail!("admin email {email} is registered to a {} account", existing.role);
        }

        let candidate = password.clone();
        let stored = existing.password.clone();
        let matches = tokio::task::spawn_blocking(move || {
            verify_password(candidate.expose_secret(), &stored.salt, &stored.hash)
        })
        .await
        .context("password verification task failed")?;
        if matches {
            return Ok(SeedOutcome::Unchanged);
        }

        let hashed = hash_blocking(password).await?;
        store
            .update_password_hash(&existing.identifier, &hashed)
            .await
            .context("failed to reset admin password")?;
        info!(email = %email, "reset admin password to match configuration");
        return Ok(SeedOutcome::PasswordReset);
    }

    let hashed = hash_blocking(password).await?;
    match store
        .create(NewCredential {
            email: email.clone(),
            role: Role::Admin,
            password: hashed,
        })
        .await?
    {
        CreateOutcome::Created(_) => {
            info!(email = %email, "seeded admin account");
            Ok(SeedOutcome::Created)
        }
        // Lost a race with another writer; treat as already seeded.
        CreateOutcome::Conflict => Ok(SeedOutcome::Unchanged),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryUserStore;

    #[tokio::test]
    async fn seeds_then_resets_then_leaves_alone() -> Result<()> {
        let store = MemoryUserStore::new();
        let first = SecretString::from("admin123");

        assert_eq!(
            seed_admin(&store, "Admin@Example.com", &first).await?,
            SeedOutcome::Created
        );
        let record = store
            .find_by_normalized_email("admin@example.com")
            .await?
            .context("admin missing")?;
        assert_eq!(record.role, Role::Admin);
        assert!(verify_password("admin123", &record.password.salt, &record.password.hash));

        assert_eq!(
            seed_admin(&store, "admin@example.com", &first).await?,
            SeedOutcome::Unchanged
        );

        let second = SecretString::from("rotated-password");
        assert_eq!(
            seed_admin(&store, "admin@example.com", &second).await?,
            SeedOutcome::PasswordReset
        );
        let updated = store
            .find_by_normalized_email("admin@example.com")
            .await?
            .context("admin missing")?;
        assert_eq!(updated.identifier, record.identifier);
        assert_ne!(updated.password.salt, record.password.salt);
        assert!(verify_password(
            "rotated-password",
            &updated.password.salt,
            &updated.password.hash
        ));
        Ok(())
    }

    #[tokio::test]
    async fn refuses_to_take_over_a_regular_account() -> Result<()> {
        let store = MemoryUserStore::new();
        let original = hash_password("squatter-pass", None)?;
        let CreateOutcome::Created(user) = store
            .create(NewCredential {
                email: "admin@example.com".to_string(),
                role: Role::User,
                password: original.clone(),
            })
            .await?
        else {
            bail!("expected a fresh account");
        };

        let result = seed_admin(
            &store,
            "admin@example.com",
            &SecretString::from("operator-pass"),
        )
        .await;
        assert!(result.is_err());

        let after = store
            .find_by_identifier(&user.identifier)
            .await?
            .context("account missing")?;
        assert_eq!(after.role, Role::User);
        assert_eq!(after.password, original);
        assert!(!verify_password(
            "operator-pass",
            &after.password.salt,
            &after.password.hash
        ));
        Ok(())
    }
}
