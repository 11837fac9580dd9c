//! Blog API endpoints
//!
//! CRUD over blog posts plus the document body read. Reads are public;
//! every mutation requires auth and, where a post is targeted, ownership.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::middleware::{ApiError, ApiJson, AppState, AuthenticatedUser};
use crate::models::{Blog, BlogDocument, CreateBlogInput, UpdateBlogInput, UserBlogIndex};

/// Response wrapper for blog lists
#[derive(Debug, Serialize)]
pub struct BlogListResponse {
    pub blogs: Vec<Blog>,
}

/// GET /blogs - List all blogs, newest first
pub async fn list_blogs_handler(
    State(state): State<AppState>,
) -> Result<Json<BlogListResponse>, ApiError> {
    let blogs = state.blog_service.list().await?;
    Ok(Json(BlogListResponse { blogs }))
}

/// GET /blogs/{id} - Get one blog's metadata row
pub async fn get_blog_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Blog>, ApiError> {
    let blog = state.blog_service.get(id).await?;
    Ok(Json(blog))
}

/// GET /blogs/{id}/document - Get one blog's published document body
pub async fn get_document_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BlogDocument>, ApiError> {
    let document = state.blog_service.document(id).await?;
    Ok(Json(document))
}

/// POST /blogs - Create a new blog
///
/// Requires authentication; the caller becomes the owner.
pub async fn create_blog_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiJson(input): ApiJson<CreateBlogInput>,
) -> Result<(StatusCode, Json<Blog>), ApiError> {
    let blog = state.blog_service.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

/// POST /blogs/{id} - Update an existing blog
///
/// Requires authentication and ownership. The request carries the whole
/// document; row, body object, and index are all overwritten.
pub async fn update_blog_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    ApiJson(input): ApiJson<UpdateBlogInput>,
) -> Result<Json<Blog>, ApiError> {
    let blog = state.blog_service.update(id, &user, input).await?;
    Ok(Json(blog))
}

/// POST /blogs/{id}/delete - Delete a blog
///
/// Requires authentication and ownership.
pub async fn delete_blog_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.blog_service.delete(id, &user).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// POST /blogs/rebuild-index - Recompute the caller's blog index
pub async fn rebuild_index_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<UserBlogIndex>, ApiError> {
    let index = state.blog_service.rebuild_index(&user).await?;
    Ok(Json(index))
}
