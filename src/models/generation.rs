//! Generation record model
//!
//! One record is created per generation-gateway operation, capturing token
//! usage and cost. The `blog` reference is back-filled once the user saves
//! the generated draft.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of generation operation that produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GenerationType {
    /// Full draft generation (title + content + tags)
    Blog,
    /// Tag extraction from existing markdown
    Tag,
}

impl GenerationType {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationType::Blog => "BLOG",
            GenerationType::Tag => "TAG",
        }
    }

    /// Parse from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BLOG" => Some(GenerationType::Blog),
            "TAG" => Some(GenerationType::Tag),
            _ => None,
        }
    }
}

impl std::fmt::Display for GenerationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generation record entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Unique identifier
    pub id: i64,
    /// Operation kind
    pub generation_type: GenerationType,
    /// Prompt tokens consumed across the operation's calls
    pub input_tokens: i64,
    /// Completion tokens produced across the operation's calls
    pub output_tokens: i64,
    /// Input spend in USD
    pub input_cost: f64,
    /// Output spend in USD
    pub output_cost: f64,
    /// Total spend in USD
    pub total_cost: f64,
    /// User the spend is attributed to
    pub user: String,
    /// Blog the draft was saved as, if any
    pub blog: Option<Uuid>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a generation record
#[derive(Debug, Clone)]
pub struct NewGeneration {
    pub generation_type: GenerationType,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
    pub user: String,
    pub blog: Option<Uuid>,
}

/// Aggregated generation spend for one user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostSummary {
    pub total_cost: f64,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_type_conversion() {
        assert_eq!(GenerationType::Blog.as_str(), "BLOG");
        assert_eq!(GenerationType::Tag.as_str(), "TAG");

        assert_eq!(GenerationType::from_str("BLOG"), Some(GenerationType::Blog));
        assert_eq!(GenerationType::from_str("tag"), Some(GenerationType::Tag));
        assert_eq!(GenerationType::from_str("TITLE"), None);
    }
}
