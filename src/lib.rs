//! Inkpress - An AI-assisted blog backend
//!
//! This library provides the core functionality for the Inkpress blog service:
//! CRUD over blog metadata rows and document-body objects, plus an LLM-backed
//! generation gateway for drafting titles, content, and tags.

pub mod api;
pub mod config;
pub mod db;
pub mod llm;
pub mod models;
pub mod services;
pub mod store;
