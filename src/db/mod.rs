//! Database layer
//!
//! SQLite-backed persistence for blog metadata rows, generation records,
//! and API tokens. Repositories are trait-based so services can be wired
//! against an in-memory database in tests.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
