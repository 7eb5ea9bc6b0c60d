//! Postgres-backed user store.
//!
//! The pool is created on first use behind a single-initialization cell; every
//! query goes through [`PgUserStore::pool`] rather than a raw global handle.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    PgPool, Row,
};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info_span, Instrument};

use super::{CreateOutcome, CredentialRecord, NewCredential, Role, UserId, UserStore};
use crate::auth::{password::PasswordHash, token::now_millis};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const SELECT_COLUMNS: &str =
    "id, email, role, password_hash, password_salt, created_at_unix_millis";

pub struct PgUserStore {
    dsn: String,
    pool: OnceCell<PgPool>,
}

impl std::fmt::Debug for PgUserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // DSN may carry a password.
        f.debug_struct("PgUserStore")
            .field("dsn", &"***")
            .field("initialized", &self.pool.initialized())
            .finish()
    }
}

impl PgUserStore {
    #[must_use]
    pub fn new(dsn: String) -> Self {
        Self {
            dsn,
            pool: OnceCell::new(),
        }
    }

    /// Connect (once) and bootstrap the schema.
    async fn pool(&self) -> Result<&PgPool> {
        self.pool
            .get_or_try_init(|| async move {
                let pool = PgPoolOptions::new()
                    .min_connections(1)
                    .max_connections(5)
                    .max_lifetime(Duration::from_secs(60 * 2))
                    .test_before_acquire(true)
                    .connect(&self.dsn)
                    .await
                    .context("Failed to connect to database")?;

                let span = info_span!(
                    "db.query",
                    db.system = "postgresql",
                    db.operation = "CREATE",
                    db.statement = SCHEMA_SQL
                );
                sqlx::raw_sql(SCHEMA_SQL)
                    .execute(&pool)
                    .instrument(span)
                    .await
                    .context("Failed to apply users schema")?;

                Ok::<PgPool, anyhow::Error>(pool)
            })
            .await
    }

    async fn fetch_one_by(&self, column: &str, value: &str) -> Result<Option<CredentialRecord>> {
        let pool = self.pool().await?;
        let query = format!("SELECT {SELECT_COLUMNS} FROM users WHERE {column} = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(pool)
            .instrument(span)
            .await
            .with_context(|| format!("failed to lookup user by {column}"))?;

        row.as_ref().map(record_from_row).transpose()
    }
}

fn record_from_row(row: &PgRow) -> Result<CredentialRecord> {
    let role: String = row.try_get("role").context("missing role column")?;
    Ok(CredentialRecord {
        identifier: UserId::from(row.try_get::<String, _>("id").context("missing id column")?),
        email: row.try_get("email").context("missing email column")?,
        role: role.parse::<Role>().map_err(|err| anyhow!(err))?,
        password: PasswordHash {
            hash: row
                .try_get("password_hash")
                .context("missing password_hash column")?,
            salt: row
                .try_get("password_salt")
                .context("missing password_salt column")?,
        },
        created_at_unix_millis: row
            .try_get("created_at_unix_millis")
            .context("missing created_at_unix_millis column")?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_identifier(&self, identifier: &UserId) -> Result<Option<CredentialRecord>> {
        self.fetch_one_by("id", identifier.as_str()).await
    }

    async fn find_by_normalized_email(&self, email: &str) -> Result<Option<CredentialRecord>> {
        self.fetch_one_by("email", email).await
    }

    async fn create(&self, credential: NewCredential) -> Result<CreateOutcome> {
        let pool = self.pool().await?;
        let record = CredentialRecord {
            identifier: UserId::generate(),
            email: credential.email,
            role: credential.role,
            password: credential.password,
            created_at_unix_millis: now_millis(),
        };

        let query = r"
            INSERT INTO users
                (id, email, role, password_hash, password_salt, created_at_unix_millis)
            VALUES ($1, $2, $3, $4, $5, $6)
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(record.identifier.as_str())
            .bind(&record.email)
            .bind(record.role.as_str())
            .bind(&record.password.hash)
            .bind(&record.password.salt)
            .bind(record.created_at_unix_millis)
            .execute(pool)
            .instrument(span)
            .await;

        match result {
            Ok(_) => Ok(CreateOutcome::Created(record)),
            Err(err) if is_unique_violation(&err) => Ok(CreateOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert user"),
        }
    }

    async fn update_password_hash(&self, identifier: &UserId, password: &PasswordHash) -> Result<()> {
        let pool = self.pool().await?;
        let query = "UPDATE users SET password_hash = $1, password_salt = $2 WHERE id = $3";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(&password.hash)
            .bind(&password.salt)
            .bind(identifier.as_str())
            .execute(pool)
            .instrument(span)
            .await
            .context("failed to update password hash")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("user not found: {identifier}"));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let pool = self.pool().await?;
        let span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        sqlx::query("SELECT 1")
            .execute(pool)
            .instrument(span)
            .await
            .context("Failed to ping database")?;
        Ok(())
    }
}
