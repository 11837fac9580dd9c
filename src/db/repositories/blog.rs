//! Blog repository
//!
//! Database operations for blog metadata rows. The document body is not
//! stored here; it lives in the object store keyed by the blog id.

use crate::models::Blog;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

/// Blog repository trait
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Insert a new blog row
    async fn create(&self, blog: &Blog) -> Result<Blog>;

    /// Get blog by id
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Blog>>;

    /// List all blogs, newest first
    async fn list(&self) -> Result<Vec<Blog>>;

    /// List one owner's blogs, newest first
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Blog>>;

    /// Overwrite title, raw markdown, and tags
    async fn update(&self, id: Uuid, title: &str, raw: &str, tags: &[String]) -> Result<()>;

    /// Add generation spend to a blog's attributed cost
    async fn add_cost(&self, id: Uuid, delta: f64) -> Result<()>;

    /// Delete a blog row; returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// SQLx-based blog repository implementation
pub struct SqlxBlogRepository {
    pool: SqlitePool,
}

impl SqlxBlogRepository {
    /// Create a new SQLx blog repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn BlogRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl BlogRepository for SqlxBlogRepository {
    async fn create(&self, blog: &Blog) -> Result<Blog> {
        let tags_json =
            serde_json::to_string(&blog.tags).context("Failed to serialize blog tags")?;

        sqlx::query(
            r#"
            INSERT INTO blogs (id, title, raw, tags, owner, cost, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(blog.id.to_string())
        .bind(&blog.title)
        .bind(&blog.raw)
        .bind(&tags_json)
        .bind(&blog.owner)
        .bind(blog.cost)
        .bind(blog.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create blog")?;

        Ok(blog.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Blog>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, raw, tags, owner, cost, created_at
            FROM blogs
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get blog by id")?;

        match row {
            Some(row) => Ok(Some(row_to_blog(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Blog>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, raw, tags, owner, cost, created_at
            FROM blogs
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list blogs")?;

        let mut blogs = Vec::new();
        for row in rows {
            blogs.push(row_to_blog(&row)?);
        }

        Ok(blogs)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Blog>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, raw, tags, owner, cost, created_at
            FROM blogs
            WHERE owner = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list blogs by owner")?;

        let mut blogs = Vec::new();
        for row in rows {
            blogs.push(row_to_blog(&row)?);
        }

        Ok(blogs)
    }

    async fn update(&self, id: Uuid, title: &str, raw: &str, tags: &[String]) -> Result<()> {
        let tags_json = serde_json::to_string(tags).context("Failed to serialize blog tags")?;

        sqlx::query(
            r#"
            UPDATE blogs
            SET title = ?, raw = ?, tags = ?
            WHERE id = ?
            "#,
        )
        .bind(title)
        .bind(raw)
        .bind(&tags_json)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update blog")?;

        Ok(())
    }

    async fn add_cost(&self, id: Uuid, delta: f64) -> Result<()> {
        sqlx::query("UPDATE blogs SET cost = cost + ? WHERE id = ?")
            .bind(delta)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to update blog cost")?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete blog")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_blog(row: &sqlx::sqlite::SqliteRow) -> Result<Blog> {
    let id_str: String = row.get("id");
    let id = Uuid::parse_str(&id_str)
        .with_context(|| format!("Invalid blog id in database: {}", id_str))?;

    let tags_json: String = row.get("tags");
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .with_context(|| format!("Invalid tags JSON in database: {}", tags_json))?;

    Ok(Blog {
        id,
        title: row.get("title"),
        raw: row.get("raw"),
        tags,
        owner: row.get("owner"),
        cost: row.get("cost"),
        created_at: row.get("created_at"),
    })
}
