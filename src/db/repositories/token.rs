//! API token repository
//!
//! Bearer tokens map to user ids. Tokens are provisioned out of band by
//! the issue-token binary; the server only resolves them.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// API token repository trait
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Store a token for a user
    async fn insert(&self, token: &str, user_id: &str) -> Result<()>;

    /// Resolve a token to its user id
    async fn resolve(&self, token: &str) -> Result<Option<String>>;
}

/// SQLx-based token repository implementation
pub struct SqlxTokenRepository {
    pool: SqlitePool,
}

impl SqlxTokenRepository {
    /// Create a new SQLx token repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn TokenRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TokenRepository for SqlxTokenRepository {
    async fn insert(&self, token: &str, user_id: &str) -> Result<()> {
        sqlx::query("INSERT INTO api_tokens (token, user_id) VALUES (?, ?)")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to insert API token")?;

        Ok(())
    }

    async fn resolve(&self, token: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT user_id FROM api_tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to resolve API token")?;

        Ok(row.map(|r| r.get("user_id")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxTokenRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxTokenRepository::new(pool)
    }

    #[tokio::test]
    async fn test_insert_and_resolve() {
        let repo = setup_test_repo().await;

        repo.insert("tok-abc", "user-1")
            .await
            .expect("Failed to insert token");

        let user = repo
            .resolve("tok-abc")
            .await
            .expect("Failed to resolve token");

        assert_eq!(user.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_resolve_unknown_token() {
        let repo = setup_test_repo().await;

        let user = repo
            .resolve("nope")
            .await
            .expect("Failed to resolve token");

        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_token_rejected() {
        let repo = setup_test_repo().await;

        repo.insert("tok-abc", "user-1").await.unwrap();
        assert!(repo.insert("tok-abc", "user-2").await.is_err());
    }
}
