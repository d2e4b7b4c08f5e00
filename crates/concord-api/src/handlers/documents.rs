//! Document upload and content handlers.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use concord_core::defaults::UPLOAD_FIELD;
use concord_core::{DocumentContent, DocumentHeader, Error};

use super::parse_id;
use crate::{ApiError, AppState};

pub const NO_FILE_PROVIDED: &str = "No file provided";

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::PayloadTooLarge(limit).into();
    }
    ApiError::BadRequest(err.body_text())
}

/// `POST /projects/:id/documents` with a multipart `file` field.
pub async fn upload_document(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let project_id = parse_id(&raw_id).ok_or_else(ApiError::project_not_found)?;
    let limit = state.max_upload_bytes;

    let mut multipart =
        multipart.map_err(|_| ApiError::BadRequest(NO_FILE_PROVIDED.to_string()))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest(NO_FILE_PROVIDED.to_string()))?;
    if bytes.len() > limit {
        return Err(Error::PayloadTooLarge(limit).into());
    }

    let outcome = state
        .ingestion
        .ingest(project_id, &filename, bytes.to_vec())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Document uploaded successfully",
            "document": outcome,
        })),
    ))
}

/// `GET /documents/:id/content`: header plus paragraphs by index.
pub async fn get_document_content(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DocumentContent>, ApiError> {
    let document_id = parse_id(&raw_id).ok_or_else(ApiError::document_not_found)?;
    let document = state
        .store
        .fetch_document(document_id)
        .await?
        .ok_or_else(ApiError::document_not_found)?;
    let paragraphs = state.store.list_paragraphs(document_id).await?;

    Ok(Json(DocumentContent {
        document: DocumentHeader {
            id: document.id,
            title: document.title,
            status: document.status,
        },
        paragraphs,
    }))
}
