//! Generation record repository
//!
//! Database operations for LLM generation records: usage logging, the
//! blog back-fill performed by the attach operation, and per-user cost
//! aggregation.

use crate::models::{CostSummary, GenerationRecord, GenerationType, NewGeneration};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

/// Generation record repository trait
#[async_trait]
pub trait GenerationRepository: Send + Sync {
    /// Insert a new generation record
    async fn insert(&self, generation: &NewGeneration) -> Result<GenerationRecord>;

    /// Get a record by id
    async fn get_by_id(&self, id: i64) -> Result<Option<GenerationRecord>>;

    /// Back-fill the blog reference of a record
    async fn set_blog(&self, id: i64, blog: Uuid) -> Result<()>;

    /// Aggregate cost and token counts over one user's records
    async fn cost_summary(&self, user: &str) -> Result<CostSummary>;
}

/// SQLx-based generation repository implementation
pub struct SqlxGenerationRepository {
    pool: SqlitePool,
}

impl SqlxGenerationRepository {
    /// Create a new SQLx generation repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn GenerationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl GenerationRepository for SqlxGenerationRepository {
    async fn insert(&self, generation: &NewGeneration) -> Result<GenerationRecord> {
        let now = chrono::Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO generations
                (generation_type, input_tokens, output_tokens, input_cost, output_cost, total_cost, user, blog, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(generation.generation_type.as_str())
        .bind(generation.input_tokens)
        .bind(generation.output_tokens)
        .bind(generation.input_cost)
        .bind(generation.output_cost)
        .bind(generation.total_cost)
        .bind(&generation.user)
        .bind(generation.blog.map(|b| b.to_string()))
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to insert generation record")?;

        Ok(GenerationRecord {
            id: result.last_insert_rowid(),
            generation_type: generation.generation_type,
            input_tokens: generation.input_tokens,
            output_tokens: generation.output_tokens,
            input_cost: generation.input_cost,
            output_cost: generation.output_cost,
            total_cost: generation.total_cost,
            user: generation.user.clone(),
            blog: generation.blog,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<GenerationRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, generation_type, input_tokens, output_tokens, input_cost, output_cost, total_cost, user, blog, created_at
            FROM generations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get generation record")?;

        match row {
            Some(row) => Ok(Some(row_to_generation(&row)?)),
            None => Ok(None),
        }
    }

    async fn set_blog(&self, id: i64, blog: Uuid) -> Result<()> {
        sqlx::query("UPDATE generations SET blog = ? WHERE id = ?")
            .bind(blog.to_string())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to set generation blog")?;

        Ok(())
    }

    async fn cost_summary(&self, user: &str) -> Result<CostSummary> {
        // SUM over an empty set is NULL; the cost fallback must be REAL or
        // the column decodes as INTEGER and fails the f64 read
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(total_cost), 0.0) AS total_cost,
                COALESCE(SUM(input_tokens), 0) AS total_input_tokens,
                COALESCE(SUM(output_tokens), 0) AS total_output_tokens
            FROM generations
            WHERE user = ?
            "#,
        )
        .bind(user)
        .fetch_one(&self.pool)
        .await
        .context("Failed to aggregate generation cost")?;

        Ok(CostSummary {
            total_cost: row.get("total_cost"),
            total_input_tokens: row.get("total_input_tokens"),
            total_output_tokens: row.get("total_output_tokens"),
        })
    }
}

fn row_to_generation(row: &sqlx::sqlite::SqliteRow) -> Result<GenerationRecord> {
    let type_str: String = row.get("generation_type");
    let generation_type = GenerationType::from_str(&type_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid generation type: {}", type_str))?;

    let blog: Option<String> = row.get("blog");
    let blog = match blog {
        Some(id_str) => Some(
            Uuid::parse_str(&id_str)
                .with_context(|| format!("Invalid blog id in generation record: {}", id_str))?,
        ),
        None => None,
    };

    Ok(GenerationRecord {
        id: row.get("id"),
        generation_type,
        input_tokens: row.get("input_tokens"),
        output_tokens: row.get("output_tokens"),
        input_cost: row.get("input_cost"),
        output_cost: row.get("output_cost"),
        total_cost: row.get("total_cost"),
        user: row.get("user"),
        blog,
        created_at: row.get("created_at"),
    })
}
