//! Generation API endpoints
//!
//! Draft and tag generation through the LLM gateway, the attach operation
//! linking a record to its saved blog, and the per-user cost summary. All
//! routes require authentication.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::{ApiError, ApiJson, AppState, AuthenticatedUser};
use crate::models::CostSummary;
use crate::services::generation::{ExtractedTags, GeneratedDraft};

/// Request body for draft generation
#[derive(Debug, Deserialize)]
pub struct GenerateDraftRequest {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub mood: String,
}

/// Request body for tag extraction
#[derive(Debug, Deserialize)]
pub struct ExtractTagsRequest {
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub blog_id: Option<Uuid>,
}

/// Request body for the attach operation
#[derive(Debug, Deserialize)]
pub struct AttachBlogRequest {
    pub blog_id: Uuid,
}

/// POST /generate - Generate a full blog draft
pub async fn generate_draft_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiJson(request): ApiJson<GenerateDraftRequest>,
) -> Result<Json<GeneratedDraft>, ApiError> {
    let draft = state
        .generation_service
        .generate_draft(&user, &request.summary, &request.mood)
        .await?;
    Ok(Json(draft))
}

/// POST /tags - Extract topic tags from markdown
pub async fn extract_tags_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiJson(request): ApiJson<ExtractTagsRequest>,
) -> Result<Json<ExtractedTags>, ApiError> {
    let extracted = state
        .generation_service
        .extract_tags(&user, &request.markdown, request.blog_id)
        .await?;
    Ok(Json(extracted))
}

/// POST /generation/{id}/attach-blog - Link a record to its saved blog
pub async fn attach_blog_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<AttachBlogRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .generation_service
        .attach_blog(&user, id, request.blog_id)
        .await?;
    Ok(Json(serde_json::json!({ "attached": true })))
}

/// GET /generation/cost - The caller's total generation spend
pub async fn total_cost_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<CostSummary>, ApiError> {
    let summary = state.generation_service.total_cost(&user).await?;
    Ok(Json(summary))
}
