//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the Inkpress blog
//! backend:
//! - Blog CRUD and document reads
//! - Generation gateway endpoints (draft, tags, attach, cost)
//! - User blog index endpoints

pub mod blogs;
pub mod generation;
pub mod index;
pub mod middleware;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Protected routes (need a valid bearer token)
    let protected_routes = Router::new()
        .route("/blogs", post(blogs::create_blog_handler))
        .route("/blogs/rebuild-index", post(blogs::rebuild_index_handler))
        .route("/blogs/{id}", post(blogs::update_blog_handler))
        .route("/blogs/{id}/delete", post(blogs::delete_blog_handler))
        .route("/generate", post(generation::generate_draft_handler))
        .route("/tags", post(generation::extract_tags_handler))
        .route(
            "/generation/{id}/attach-blog",
            post(generation::attach_blog_handler),
        )
        .route("/generation/cost", get(generation::total_cost_handler))
        .route("/users/index/title", post(index::set_index_title_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .route("/blogs", get(blogs::list_blogs_handler))
        .route("/blogs/{id}", get(blogs::get_blog_handler))
        .route("/blogs/{id}/document", get(blogs::get_document_handler))
        .route("/users/{user_id}/index", get(index::get_index_handler))
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Result<Router> {
    let cors = if cors_origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origin: HeaderValue = cors_origin
            .parse()
            .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
    };

    Ok(Router::new()
        .merge(build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
