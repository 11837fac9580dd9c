//! API middleware
//!
//! Contains:
//! - Shared application state
//! - Bearer-token authentication middleware
//! - The `ApiError` response type and its service-error conversions

use axum::{
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::repositories::TokenRepository;
use crate::services::{BlogService, BlogServiceError, GenerationService, GenerationServiceError};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub blog_service: Arc<BlogService>,
    pub generation_service: Arc<GenerationService>,
    pub tokens: Arc<dyn TokenRepository>,
}

/// Authenticated user id extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn upstream_failure(message: impl Into<String>) -> Self {
        Self::new("UPSTREAM_FAILURE", message)
    }

    pub fn generated_output_invalid(message: impl Into<String>) -> Self {
        Self::new("GENERATED_OUTPUT_INVALID", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<BlogServiceError> for ApiError {
    fn from(err: BlogServiceError) -> Self {
        match err {
            BlogServiceError::NotFound(msg) => ApiError::not_found(format!("Blog not found: {}", msg)),
            BlogServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            BlogServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            BlogServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<GenerationServiceError> for ApiError {
    fn from(err: GenerationServiceError) -> Self {
        match err {
            GenerationServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            GenerationServiceError::InvalidOutput(msg) => ApiError::generated_output_invalid(msg),
            GenerationServiceError::NotFound(msg) => {
                ApiError::not_found(format!("Generation record not found: {}", msg))
            }
            GenerationServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            GenerationServiceError::Upstream(e) => ApiError::upstream_failure(e.to_string()),
            GenerationServiceError::InternalError(e) => {
                ApiError::internal_error(format!("{:#}", e))
            }
        }
    }
}

/// Extract bearer token from request
fn extract_bearer_token(request: &Request) -> Option<String> {
    let auth_header = request.headers().get(header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    auth_str.strip_prefix("Bearer ").map(|t| t.to_string())
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user_id = state
        .tokens
        .resolve(&token)
        .await
        .map_err(|e| ApiError::internal_error(format!("Token lookup failed: {:#}", e)))?
        .ok_or_else(|| ApiError::unauthorized("Invalid token"))?;

    request.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(next.run(request).await)
}

/// JSON body extractor whose rejection uses the structured error envelope
///
/// Axum's default extractor rejects malformed or incomplete bodies with a
/// plain-text response; handlers take this wrapper instead so those
/// failures come back as VALIDATION_ERROR like every other bad input.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(request, state).await {
            Ok(axum::Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::validation_error(rejection.body_text())),
        }
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
