//! Error types for concord.

use thiserror::Error;
use uuid::Uuid;

use crate::models::DocumentStatus;

/// Result type alias using concord's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for concord operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Project not found
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Uploaded file does not carry the accepted extension
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Uploaded file exceeds the configured size bound (bytes)
    #[error("Payload too large: limit is {0} bytes")]
    PayloadTooLarge(usize),

    /// Bytes could not be parsed as a rich-text document
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Document parsed but yielded no non-empty paragraphs
    #[error("Document contains no paragraphs")]
    EmptyDocument,

    /// Analysis Engine call failed (transport or non-success status)
    #[error("Analysis engine error: {0}")]
    AnalysisEngine(String),

    /// Document status change not permitted by the state machine
    #[error("Invalid status transition for document {id}: {from} -> {to}")]
    InvalidStateTransition {
        id: Uuid,
        from: DocumentStatus,
        to: DocumentStatus,
    },

    /// Operation conflicts with one already in progress
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
