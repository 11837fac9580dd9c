//! Data models for the Inkpress blog backend

pub mod blog;
pub mod generation;
pub mod index;

pub use blog::{Blog, BlogDocument, CreateBlogInput, UpdateBlogInput};
pub use generation::{CostSummary, GenerationRecord, GenerationType, NewGeneration};
pub use index::{BlogSummary, UserBlogIndex};
