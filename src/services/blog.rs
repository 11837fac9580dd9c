//! Blog service
//!
//! Implements business logic for blog management:
//! - CRUD over blog metadata rows
//! - Document body publishing to the object store
//! - Incremental maintenance of the per-owner blog index
//!
//! Writes follow a fixed order: row first, then body object, then index.
//! No transaction spans the database and the bucket; a failure mid-sequence
//! leaves the earlier writes in place and is surfaced to the caller.

use crate::db::repositories::BlogRepository;
use crate::models::{
    Blog, BlogDocument, BlogSummary, CreateBlogInput, UpdateBlogInput, UserBlogIndex,
};
use crate::store::ObjectStore;
use anyhow::Context;
use std::sync::Arc;
use uuid::Uuid;

/// Error types for blog service operations
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    /// Blog not found
    #[error("Blog not found: {0}")]
    NotFound(String),

    /// Caller is not the owner
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Blog service for managing posts and their published documents
pub struct BlogService {
    repo: Arc<dyn BlogRepository>,
    store: Arc<dyn ObjectStore>,
}

impl BlogService {
    /// Create a new blog service
    pub fn new(repo: Arc<dyn BlogRepository>, store: Arc<dyn ObjectStore>) -> Self {
        Self { repo, store }
    }

    /// List all blogs, newest first
    pub async fn list(&self) -> Result<Vec<Blog>, BlogServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list blogs")
            .map_err(Into::into)
    }

    /// Get a blog by id
    pub async fn get(&self, id: Uuid) -> Result<Blog, BlogServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get blog")?
            .ok_or_else(|| BlogServiceError::NotFound(id.to_string()))
    }

    /// Get a blog's published document body
    pub async fn document(&self, id: Uuid) -> Result<BlogDocument, BlogServiceError> {
        // The row must exist; the body key is derived from it
        let blog = self.get(id).await?;

        let data = self
            .store
            .get(&blog.body_key())
            .await
            .context("Failed to read blog document")?
            .ok_or_else(|| BlogServiceError::NotFound(id.to_string()))?;

        serde_json::from_slice(&data)
            .context("Failed to parse stored blog document")
            .map_err(Into::into)
    }

    /// Create a new blog
    ///
    /// Inserts the metadata row, publishes the document body, and prepends
    /// a summary entry to the owner's index.
    pub async fn create(
        &self,
        owner: &str,
        input: CreateBlogInput,
    ) -> Result<Blog, BlogServiceError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(BlogServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        if input.raw.trim().is_empty() {
            return Err(BlogServiceError::ValidationError(
                "Content cannot be empty".to_string(),
            ));
        }
        if input.tags.is_empty() {
            return Err(BlogServiceError::ValidationError(
                "At least one tag is required".to_string(),
            ));
        }

        let blog = Blog::new(
            title.to_string(),
            input.raw.clone(),
            input.tags.clone(),
            owner.to_string(),
        );

        let created = self
            .repo
            .create(&blog)
            .await
            .context("Failed to create blog")?;

        let document = BlogDocument {
            title: created.title.clone(),
            tags: created.tags.clone(),
            content: input.document_content(),
        };
        self.put_document(&created, &document).await?;

        let mut index = self.load_index(owner).await?.unwrap_or_default();
        index.prepend(summary_of(&created));
        self.save_index(owner, &index).await?;

        Ok(created)
    }

    /// Update an existing blog
    ///
    /// Overwrites the row, re-publishes the full document body, and upserts
    /// the owner's index entry. Caller must be the owner.
    pub async fn update(
        &self,
        id: Uuid,
        caller: &str,
        input: UpdateBlogInput,
    ) -> Result<Blog, BlogServiceError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(BlogServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        if input.raw.trim().is_empty() {
            return Err(BlogServiceError::ValidationError(
                "Content cannot be empty".to_string(),
            ));
        }

        let blog = self.get(id).await?;
        if blog.owner != caller {
            return Err(BlogServiceError::Forbidden(
                "Only the owner can modify this blog".to_string(),
            ));
        }

        self.repo
            .update(id, title, &input.raw, &input.tags)
            .await
            .context("Failed to update blog")?;

        let updated = Blog {
            title: title.to_string(),
            raw: input.raw.clone(),
            tags: input.tags.clone(),
            ..blog
        };

        let document = BlogDocument {
            title: updated.title.clone(),
            tags: updated.tags.clone(),
            content: input.content,
        };
        self.put_document(&updated, &document).await?;

        let mut index = self.load_index(caller).await?.unwrap_or_default();
        index.upsert(summary_of(&updated));
        self.save_index(caller, &index).await?;

        Ok(updated)
    }

    /// Delete a blog
    ///
    /// Removes the row, then the body object (tolerating its absence), then
    /// prunes the owner's index. An absent index counts as already pruned.
    pub async fn delete(&self, id: Uuid, caller: &str) -> Result<(), BlogServiceError> {
        let blog = self.get(id).await?;
        if blog.owner != caller {
            return Err(BlogServiceError::Forbidden(
                "Only the owner can delete this blog".to_string(),
            ));
        }

        self.repo
            .delete(id)
            .await
            .context("Failed to delete blog")?;

        // Missing body object is fine; the row is already gone
        self.store
            .delete(&blog.body_key())
            .await
            .context("Failed to delete blog document")?;

        let Some(mut index) = self.load_index(caller).await? else {
            return Ok(());
        };
        if index.remove(id) {
            self.save_index(caller, &index).await?;
        }

        Ok(())
    }

    /// Get an owner's blog index, or an empty one if none exists yet
    pub async fn owner_index(&self, owner: &str) -> Result<UserBlogIndex, BlogServiceError> {
        Ok(self.load_index(owner).await?.unwrap_or_default())
    }

    /// Set the display title of the caller's index
    pub async fn set_index_title(
        &self,
        owner: &str,
        title: &str,
    ) -> Result<UserBlogIndex, BlogServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BlogServiceError::ValidationError(
                "Index title cannot be empty".to_string(),
            ));
        }

        let mut index = self.load_index(owner).await?.unwrap_or_default();
        index.title = title.to_string();
        self.save_index(owner, &index).await?;

        Ok(index)
    }

    /// Recompute the caller's index from the blog rows
    ///
    /// Idempotent reconciliation for when incremental maintenance has
    /// drifted. The display title is preserved.
    pub async fn rebuild_index(&self, owner: &str) -> Result<UserBlogIndex, BlogServiceError> {
        let blogs = self
            .repo
            .list_by_owner(owner)
            .await
            .context("Failed to list blogs for index rebuild")?;

        let mut index = self.load_index(owner).await?.unwrap_or_default();
        index.blogs = blogs.iter().map(summary_of).collect();
        self.save_index(owner, &index).await?;

        Ok(index)
    }

    async fn put_document(
        &self,
        blog: &Blog,
        document: &BlogDocument,
    ) -> Result<(), BlogServiceError> {
        let data = serde_json::to_vec(document).context("Failed to serialize blog document")?;
        self.store
            .put(&blog.body_key(), &data)
            .await
            .context("Failed to store blog document")?;
        Ok(())
    }

    async fn load_index(&self, owner: &str) -> Result<Option<UserBlogIndex>, BlogServiceError> {
        let data = self
            .store
            .get(&UserBlogIndex::key(owner))
            .await
            .context("Failed to read blog index")?;

        match data {
            Some(data) => {
                let index =
                    serde_json::from_slice(&data).context("Failed to parse stored blog index")?;
                Ok(Some(index))
            }
            None => Ok(None),
        }
    }

    async fn save_index(
        &self,
        owner: &str,
        index: &UserBlogIndex,
    ) -> Result<(), BlogServiceError> {
        let data = serde_json::to_vec(index).context("Failed to serialize blog index")?;
        self.store
            .put(&UserBlogIndex::key(owner), &data)
            .await
            .context("Failed to store blog index")?;
        Ok(())
    }
}

fn summary_of(blog: &Blog) -> BlogSummary {
    BlogSummary {
        id: blog.id,
        title: blog.title.clone(),
        tags: blog.tags.clone(),
    }
}
