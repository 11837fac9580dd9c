//! Services layer
//!
//! Business logic between the HTTP handlers and the repositories/stores.

pub mod blog;
pub mod generation;

pub use blog::{BlogService, BlogServiceError};
pub use generation::{GenerationService, GenerationServiceError};
