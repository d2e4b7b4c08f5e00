//! # concord-engine
//!
//! HTTP client for the external Analysis Engine.
//!
//! The engine indexes document paragraphs for similarity search and compares
//! two documents of a project, returning the inconsistencies it finds. Both
//! calls can take minutes, so the client carries a long request timeout.
//!
//! # Example
//!
//! ```rust,no_run
//! use concord_core::AnalysisEngine;
//! use concord_engine::AnalysisEngineClient;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = AnalysisEngineClient::from_env().unwrap();
//!     let (project, a, b) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
//!     let found = engine.analyze_pair(project, a, b).await.unwrap();
//!     println!("{} inconsistencies", found.len());
//! }
//! ```

mod client;
mod types;

pub use client::{AnalysisEngineClient, EngineConfig, DEFAULT_ENGINE_URL, DEFAULT_TIMEOUT_SECS};
pub use types::*;
