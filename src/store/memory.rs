use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{CreateOutcome, CredentialRecord, NewCredential, UserId, UserStore};
use crate::auth::{password::PasswordHash, token::now_millis};

/// Process-local store, used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<UserId, CredentialRecord>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_identifier(&self, identifier: &UserId) -> Result<Option<CredentialRecord>> {
        Ok(self.users.read().await.get(identifier).cloned())
    }

    async fn find_by_normalized_email(&self, email: &str) -> Result<Option<CredentialRecord>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|record| record.email == email)
            .cloned())
    }

    async fn create(&self, credential: NewCredential) -> Result<CreateOutcome> {
        // Uniqueness check and insert under one write lock.
        let mut users = self.users.write().await;
        if users.values().any(|record| record.email == credential.email) {
            return Ok(CreateOutcome::Conflict);
        }

        let record = CredentialRecord {
            identifier: UserId::generate(),
            email: credential.email,
            role: credential.role,
            password: credential.password,
            created_at_unix_millis: now_millis(),
        };
        users.insert(record.identifier.clone(), record.clone());

        Ok(CreateOutcome::Created(record))
    }

    async fn update_password_hash(&self, identifier: &UserId, password: &PasswordHash) -> Result<()> {
        let mut users = self.users.write().await;
        let record = users
            .get_mut(identifier)
            .ok_or_else(|| anyhow!("user not found: {identifier}"))?;
        record.password = password.clone();
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Role;
    use anyhow::Context;

    fn credential(email: &str) -> NewCredential {
        NewCredential {
            email: email.to_string(),
            role: Role::User,
            password: PasswordHash {
                hash: "aa".to_string(),
                salt: "bb".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn create_then_find() -> Result<()> {
        let store = MemoryUserStore::new();
        let CreateOutcome::Created(created) = store.create(credential("a@b.com")).await? else {
            anyhow::bail!("expected created");
        };

        let by_id = store
            .find_by_identifier(&created.identifier)
            .await?
            .context("missing by id")?;
        assert_eq!(by_id, created);

        let by_email = store
            .find_by_normalized_email("a@b.com")
            .await?
            .context("missing by email")?;
        assert_eq!(by_email.identifier, created.identifier);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() -> Result<()> {
        let store = MemoryUserStore::new();
        store.create(credential("a@b.com")).await?;
        assert!(matches!(
            store.create(credential("a@b.com")).await?,
            CreateOutcome::Conflict
        ));
        Ok(())
    }

    #[tokio::test]
    async fn update_password_hash_replaces_values() -> Result<()> {
        let store = MemoryUserStore::new();
        let CreateOutcome::Created(created) = store.create(credential("a@b.com")).await? else {
            anyhow::bail!("expected created");
        };
        let replacement = PasswordHash {
            hash: "cc".to_string(),
            salt: "dd".to_string(),
        };
        store
            .update_password_hash(&created.identifier, &replacement)
            .await?;
        let updated = store
            .find_by_identifier(&created.identifier)
            .await?
            .context("missing")?;
        assert_eq!(updated.password, replacement);
        Ok(())
    }

    #[tokio::test]
    async fn update_unknown_user_fails() {
        let store = MemoryUserStore::new();
        let password = PasswordHash {
            hash: "cc".to_string(),
            salt: "dd".to_string(),
        };
        assert!(store
            .update_password_hash(&UserId::from("missing"), &password)
            .await
            .is_err());
    }
}
