//! Per-owner blog index
//!
//! A denormalized listing of one owner's blogs, stored as a single JSON
//! object in the bucket under `<owner>.json`. It is patched incrementally
//! on every create/update/delete and can drift from the rows; the rebuild
//! operation recomputes it wholesale from the Content Store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_index_title() -> String {
    "My Blog".to_string()
}

/// Summary entry in a user's blog index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogSummary {
    pub id: Uuid,
    pub title: String,
    pub tags: Vec<String>,
}

/// Denormalized per-owner blog list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBlogIndex {
    /// Site display name shown on the owner's blog page
    #[serde(default = "default_index_title")]
    pub title: String,
    /// Ordered summaries, newest first
    #[serde(default)]
    pub blogs: Vec<BlogSummary>,
}

impl Default for UserBlogIndex {
    fn default() -> Self {
        Self {
            title: default_index_title(),
            blogs: Vec::new(),
        }
    }
}

impl UserBlogIndex {
    /// Object-store key of an owner's index
    pub fn key(owner: &str) -> String {
        format!("{}.json", owner)
    }

    /// Prepend a new entry
    pub fn prepend(&mut self, summary: BlogSummary) {
        self.blogs.insert(0, summary);
    }

    /// Replace the entry with a matching id, or prepend it if missing
    pub fn upsert(&mut self, summary: BlogSummary) {
        match self.blogs.iter_mut().find(|b| b.id == summary.id) {
            Some(existing) => *existing = summary,
            None => self.prepend(summary),
        }
    }

    /// Remove the entry with the given id; returns whether one was removed
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.blogs.len();
        self.blogs.retain(|b| b.id != id);
        self.blogs.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(title: &str) -> BlogSummary {
        BlogSummary {
            id: Uuid::new_v4(),
            title: title.to_string(),
            tags: vec!["t".to_string()],
        }
    }

    #[test]
    fn test_default_index() {
        let index = UserBlogIndex::default();
        assert_eq!(index.title, "My Blog");
        assert!(index.blogs.is_empty());
    }

    #[test]
    fn test_prepend_orders_newest_first() {
        let mut index = UserBlogIndex::default();
        let first = summary("first");
        let second = summary("second");
        index.prepend(first.clone());
        index.prepend(second.clone());

        assert_eq!(index.blogs, vec![second, first]);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut index = UserBlogIndex::default();
        let a = summary("a");
        let b = summary("b");
        index.prepend(a.clone());
        index.prepend(b.clone());

        let mut updated = a.clone();
        updated.title = "a2".to_string();
        index.upsert(updated.clone());

        assert_eq!(index.blogs, vec![b, updated]);
    }

    #[test]
    fn test_upsert_prepends_when_missing() {
        let mut index = UserBlogIndex::default();
        index.prepend(summary("a"));

        let fresh = summary("fresh");
        index.upsert(fresh.clone());

        assert_eq!(index.blogs[0], fresh);
        assert_eq!(index.blogs.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut index = UserBlogIndex::default();
        let a = summary("a");
        index.prepend(a.clone());

        assert!(index.remove(a.id));
        assert!(!index.remove(a.id));
        assert!(index.blogs.is_empty());
    }

    #[test]
    fn test_deserializes_with_missing_fields() {
        let index: UserBlogIndex = serde_json::from_str("{}").unwrap();
        assert_eq!(index.title, "My Blog");
        assert!(index.blogs.is_empty());
    }
}
