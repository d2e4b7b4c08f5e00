//! HTTP error responses.
//!
//! Every error leaves the server as `{ "status": "error", "message": ... }`.
//! Internal details are logged, never returned.

use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::{error, warn};

use concord_core::Error;

pub const PROJECT_NOT_FOUND: &str = "Project not found";
pub const DOCUMENT_NOT_FOUND: &str = "Document not found";
pub const PARSE_FAILED: &str = "Failed to parse document. File may be corrupted.";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    Conflict(String),
    /// Upstream Analysis Engine failure; the message is safe to return.
    #[error("{0}")]
    Engine(String),
    /// Anything unclassified. The detail is logged only.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn project_not_found() -> Self {
        ApiError::NotFound(PROJECT_NOT_FOUND.to_string())
    }

    pub fn document_not_found() -> Self {
        ApiError::NotFound(DOCUMENT_NOT_FOUND.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Engine(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::ProjectNotFound(_) => ApiError::project_not_found(),
            Error::DocumentNotFound(_) => ApiError::document_not_found(),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) | Error::UnsupportedFileType(msg) => ApiError::BadRequest(msg),
            Error::MalformedDocument(detail) => {
                warn!(error = %detail, "Rejected malformed document");
                ApiError::BadRequest(PARSE_FAILED.to_string())
            }
            Error::EmptyDocument => ApiError::BadRequest(Error::EmptyDocument.to_string()),
            Error::PayloadTooLarge(limit) => ApiError::PayloadTooLarge(format!(
                "File too large. Maximum size is {} bytes",
                limit
            )),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::AnalysisEngine(msg) => ApiError::Engine(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(detail) => {
                error!(error = %detail, "Internal error while handling request");
                INTERNAL_ERROR.to_string()
            }
            ApiError::Engine(msg) => {
                error!(error = %msg, "Analysis engine failure");
                msg
            }
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Conflict(msg) => msg,
        };

        let body = Json(serde_json::json!({
            "status": "error",
            "message": message,
        }));

        (status, body).into_response()
    }
}
