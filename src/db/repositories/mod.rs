//! Repository layer
//!
//! Trait-based data access over the SQLite pool. Each repository exposes a
//! trait so services can be tested against an in-memory database.

pub mod blog;
pub mod generation;
pub mod token;

pub use blog::{BlogRepository, SqlxBlogRepository};
pub use generation::{GenerationRepository, SqlxGenerationRepository};
pub use token::{SqlxTokenRepository, TokenRepository};
