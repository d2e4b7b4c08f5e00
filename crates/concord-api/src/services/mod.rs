//! Service layer for the ingestion and consistency workflows.

pub mod consistency;
pub mod ingestion;
pub mod run_guard;

pub use consistency::ConsistencyService;
pub use ingestion::IngestionService;
pub use run_guard::{RunPermit, RunRegistry};
