//! User blog index endpoints
//!
//! Read access to any owner's denormalized blog index, plus the display
//! title update for the caller's own index.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, ApiJson, AppState, AuthenticatedUser};
use crate::models::UserBlogIndex;

/// Request body for the index title update
#[derive(Debug, Deserialize)]
pub struct SetIndexTitleRequest {
    #[serde(default)]
    pub title: String,
}

/// GET /users/{user_id}/index - An owner's blog index
///
/// Public; an owner with no index yet gets an empty default.
pub async fn get_index_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserBlogIndex>, ApiError> {
    let index = state.blog_service.owner_index(&user_id).await?;
    Ok(Json(index))
}

/// POST /users/index/title - Set the caller's index display title
pub async fn set_index_title_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiJson(request): ApiJson<SetIndexTitleRequest>,
) -> Result<Json<UserBlogIndex>, ApiError> {
    let index = state
        .blog_service
        .set_index_title(&user, &request.title)
        .await?;
    Ok(Json(index))
}
