//! # concord-core
//!
//! Core types, traits, and abstractions for concord.
//!
//! This crate provides the domain model (projects, documents, paragraphs,
//! inconsistencies), the error taxonomy, and the trait seams that the
//! storage, extraction, and Analysis Engine crates implement.
//!
//! Log events across the workspace carry `subsystem`, `component` and `op`
//! fields. WARN marks a skipped record or a fallback, ERROR a failed
//! operation.

pub mod defaults;
pub mod error;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;

/// Generate a new time-ordered UUIDv7 identifier.
pub fn new_v7() -> uuid::Uuid {
    uuid::Uuid::now_v7()
}
