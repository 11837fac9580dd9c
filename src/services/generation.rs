//! Generation service
//!
//! Drives the LLM gateway: full draft generation (title, content, tags as
//! three sequential calls with hard output validation) and tag extraction
//! (single call with silent degradation). Every operation persists a
//! generation record with token usage and cost; attach-blog later links a
//! record to the blog the draft was saved as.

use crate::config::LlmConfig;
use crate::db::repositories::{BlogRepository, GenerationRepository};
use crate::llm::{ChatClient, ChatRequest, LlmError, TokenUsage};
use crate::models::{CostSummary, GenerationType, NewGeneration};
use anyhow::Context;
use std::sync::Arc;
use uuid::Uuid;

const TITLE_MIN_CHARS: usize = 3;
const TITLE_MAX_CHARS: usize = 150;
const CONTENT_MIN_CHARS: usize = 100;
const TAGS_MIN: usize = 2;
const TAGS_MAX: usize = 10;

/// Error types for generation service operations
#[derive(Debug, thiserror::Error)]
pub enum GenerationServiceError {
    /// Request input invalid
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Model output failed validation
    #[error("Invalid generated output: {0}")]
    InvalidOutput(String),

    /// Generation record not found
    #[error("Generation record not found: {0}")]
    NotFound(String),

    /// Record belongs to another user
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Upstream LLM API failure
    #[error("Upstream failure: {0}")]
    Upstream(#[from] LlmError),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// A generated blog draft
#[derive(Debug, Clone, serde::Serialize)]
pub struct GeneratedDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Record id for the later attach operation; None if logging failed
    pub generation_id: Option<i64>,
}

/// Usage breakdown returned with extracted tags
#[derive(Debug, Clone, serde::Serialize)]
pub struct GenerationUsage {
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

/// Tag extraction result
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExtractedTags {
    pub tags: Vec<String>,
    pub usage: GenerationUsage,
}

/// Generation service for LLM-assisted authoring
pub struct GenerationService {
    llm: Arc<dyn ChatClient>,
    records: Arc<dyn GenerationRepository>,
    blogs: Arc<dyn BlogRepository>,
    input_cost_per_mtok: f64,
    output_cost_per_mtok: f64,
}

impl GenerationService {
    /// Create a new generation service
    pub fn new(
        llm: Arc<dyn ChatClient>,
        records: Arc<dyn GenerationRepository>,
        blogs: Arc<dyn BlogRepository>,
        config: &LlmConfig,
    ) -> Self {
        Self {
            llm,
            records,
            blogs,
            input_cost_per_mtok: config.input_cost_per_mtok,
            output_cost_per_mtok: config.output_cost_per_mtok,
        }
    }

    /// Generate a full blog draft from a summary and a mood
    ///
    /// Three sequential calls: title, then content conditioned on the title,
    /// then tags. Each output is validated; any failure aborts the whole
    /// operation with no partial result. Usage is summed across the calls
    /// and logged as one BLOG record.
    pub async fn generate_draft(
        &self,
        user: &str,
        summary: &str,
        mood: &str,
    ) -> Result<GeneratedDraft, GenerationServiceError> {
        if summary.trim().is_empty() || mood.trim().is_empty() {
            return Err(GenerationServiceError::ValidationError(
                "summary and mood are required".to_string(),
            ));
        }

        let mut usage = TokenUsage::default();

        // Call 1: title
        let title_prompt = format!(
            "Write a short, catchy blog title for the following idea.\n\
             Mood: {mood}.\n\
             Summary:\n{summary}\n\n\
             Keep it under 10 words.\n\
             Return only the title text.",
        );
        let completion = self.llm.complete(&draft_request(title_prompt)).await?;
        usage.add(completion.usage);

        let title: String = completion
            .content
            .chars()
            .filter(|c| *c != '"' && *c != '\'')
            .collect();
        let title = title.trim().to_string();
        if title.chars().count() < TITLE_MIN_CHARS || title.chars().count() > TITLE_MAX_CHARS {
            return Err(GenerationServiceError::InvalidOutput(format!(
                "Title must be {} to {} characters",
                TITLE_MIN_CHARS, TITLE_MAX_CHARS
            )));
        }

        // Call 2: content, conditioned on the generated title
        let content_prompt = format!(
            "Write a long, well-structured blog post titled \"{title}\".\n\
             Use markdown formatting (headings, lists, quotes, etc.).\n\
             Keep the tone {}.\n\
             Summary:\n{summary}",
            mood.to_lowercase(),
        );
        let completion = self.llm.complete(&draft_request(content_prompt)).await?;
        usage.add(completion.usage);

        let content = completion.content.trim().to_string();
        if content.chars().count() < CONTENT_MIN_CHARS {
            return Err(GenerationServiceError::InvalidOutput(format!(
                "Content must be at least {} characters",
                CONTENT_MIN_CHARS
            )));
        }

        // Call 3: tags
        let tags_prompt = format!(
            "List 5 short, relevant tags (1-3 words each) for a blog titled \"{title}\".\n\
             Separate them with commas.",
        );
        let completion = self.llm.complete(&draft_request(tags_prompt)).await?;
        usage.add(completion.usage);

        let tags: Vec<String> = completion
            .content
            .split(',')
            .map(|t| t.trim().trim_start_matches('#').trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.len() < TAGS_MIN || tags.len() > TAGS_MAX {
            return Err(GenerationServiceError::InvalidOutput(format!(
                "Expected {} to {} tags, got {}",
                TAGS_MIN,
                TAGS_MAX,
                tags.len()
            )));
        }

        let generation_id = self
            .log_generation(GenerationType::Blog, usage, user, None)
            .await;

        Ok(GeneratedDraft {
            title,
            content,
            tags,
            generation_id,
        })
    }

    /// Extract topic tags from markdown content
    ///
    /// Single call prompted to emit a JSON array. Output that fails to parse
    /// as an array of strings degrades to an empty list rather than an
    /// error; usage is recorded either way.
    pub async fn extract_tags(
        &self,
        user: &str,
        markdown: &str,
        blog: Option<Uuid>,
    ) -> Result<ExtractedTags, GenerationServiceError> {
        if markdown.trim().is_empty() {
            return Err(GenerationServiceError::ValidationError(
                "Markdown content required".to_string(),
            ));
        }

        let prompt = format!(
            "Extract 5-10 relevant topic tags for the following Markdown content.\n\
             Return ONLY a valid JSON array of strings (like [\"tag1\",\"tag2\",...]) and nothing else.\n\n\
             Markdown:\n{markdown}",
        );
        let completion = self
            .llm
            .complete(&ChatRequest {
                system: Some("You are a precise JSON generator.".to_string()),
                prompt,
                temperature: 0.3,
                max_tokens: None,
            })
            .await?;

        let tags: Vec<String> = match serde_json::from_str(completion.content.trim()) {
            Ok(tags) => tags,
            Err(e) => {
                tracing::warn!("Tag extraction returned invalid JSON: {}", e);
                Vec::new()
            }
        };

        let usage = completion.usage;
        self.log_generation(GenerationType::Tag, usage, user, blog)
            .await;

        Ok(ExtractedTags {
            tags,
            usage: self.usage_breakdown(usage),
        })
    }

    /// Link a generation record to the blog its draft was saved as
    ///
    /// Also attributes the record's spend to the blog row when it exists.
    pub async fn attach_blog(
        &self,
        user: &str,
        generation_id: i64,
        blog_id: Uuid,
    ) -> Result<(), GenerationServiceError> {
        let record = self
            .records
            .get_by_id(generation_id)
            .await
            .context("Failed to get generation record")?
            .ok_or_else(|| GenerationServiceError::NotFound(generation_id.to_string()))?;

        if record.user != user {
            return Err(GenerationServiceError::Forbidden(
                "Generation record belongs to another user".to_string(),
            ));
        }

        self.records
            .set_blog(generation_id, blog_id)
            .await
            .context("Failed to attach blog to generation record")?;

        let blog = self
            .blogs
            .get_by_id(blog_id)
            .await
            .context("Failed to get blog for cost attribution")?;
        if blog.is_some() {
            self.blogs
                .add_cost(blog_id, record.total_cost)
                .await
                .context("Failed to attribute generation cost")?;
        }

        Ok(())
    }

    /// Total generation spend and token counts for one user
    pub async fn total_cost(&self, user: &str) -> Result<CostSummary, GenerationServiceError> {
        self.records
            .cost_summary(user)
            .await
            .context("Failed to aggregate generation cost")
            .map_err(Into::into)
    }

    fn usage_breakdown(&self, usage: TokenUsage) -> GenerationUsage {
        let input_cost = usage.prompt_tokens as f64 / 1_000_000.0 * self.input_cost_per_mtok;
        let output_cost = usage.completion_tokens as f64 / 1_000_000.0 * self.output_cost_per_mtok;
        GenerationUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }

    /// Persist a generation record; failure is logged, never fatal
    async fn log_generation(
        &self,
        generation_type: GenerationType,
        usage: TokenUsage,
        user: &str,
        blog: Option<Uuid>,
    ) -> Option<i64> {
        let breakdown = self.usage_breakdown(usage);
        tracing::info!(
            "{} generation for {}: {} input / {} output tokens, ${:.6}",
            generation_type,
            user,
            breakdown.input_tokens,
            breakdown.output_tokens,
            breakdown.total_cost
        );

        let record = NewGeneration {
            generation_type,
            input_tokens: breakdown.input_tokens,
            output_tokens: breakdown.output_tokens,
            input_cost: breakdown.input_cost,
            output_cost: breakdown.output_cost,
            total_cost: breakdown.total_cost,
            user: user.to_string(),
            blog,
        };

        match self.records.insert(&record).await {
            Ok(created) => Some(created.id),
            Err(e) => {
                tracing::error!("Failed to log generation record: {:#}", e);
                None
            }
        }
    }
}

/// Draft calls share the original temperature and length cap
fn draft_request(prompt: String) -> ChatRequest {
    ChatRequest {
        system: None,
        prompt,
        temperature: 0.7,
        max_tokens: Some(2048),
    }
}
