//! Blog model
//!
//! This module provides:
//! - `Blog` entity representing a blog post's metadata row
//! - `BlogDocument` for the full document body stored in the object store
//! - Input types for creating and updating blogs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Blog metadata entity
///
/// The row holds the raw markdown source alongside the display metadata;
/// the rich-editor document body lives in the object store under
/// `<id>.json` and is always overwritten whole on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    /// Unique identifier, immutable once created
    pub id: Uuid,
    /// Blog title
    pub title: String,
    /// Raw markdown source
    pub raw: String,
    /// Ordered tag list (may be empty)
    pub tags: Vec<String>,
    /// Owning user id; set at creation, authorizes all mutations
    pub owner: String,
    /// Generation spend attributed to this post, in USD
    pub cost: f64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Blog {
    /// Create a new blog with a fresh id
    pub fn new(title: String, raw: String, tags: Vec<String>, owner: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            raw,
            tags,
            owner,
            cost: 0.0,
            created_at: Utc::now(),
        }
    }

    /// Object-store key of this blog's document body
    pub fn body_key(&self) -> String {
        format!("{}.json", self.id)
    }
}

/// Full document body as stored in the object store
///
/// `content` is the editor's native block-structured value and is treated
/// as opaque JSON; earlier revisions stored a plain markdown string there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogDocument {
    pub title: String,
    pub tags: Vec<String>,
    pub content: serde_json::Value,
}

/// Input for creating a new blog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlogInput {
    /// Blog title
    pub title: String,
    /// Raw markdown source
    pub raw: String,
    /// Tag list
    pub tags: Vec<String>,
    /// Editor document content; falls back to the raw markdown when absent
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

impl CreateBlogInput {
    /// Resolve the document content, defaulting to the raw markdown
    pub fn document_content(&self) -> serde_json::Value {
        self.content
            .clone()
            .unwrap_or_else(|| serde_json::Value::String(self.raw.clone()))
    }
}

/// Input for updating an existing blog
///
/// Every field is required: a save always carries the whole document,
/// and the stored body is overwritten rather than patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBlogInput {
    pub title: String,
    pub raw: String,
    pub tags: Vec<String>,
    pub content: serde_json::Value,
}
