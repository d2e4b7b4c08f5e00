//! Consistency run and inconsistency listing handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::parse_id;
use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InconsistencyQuery {
    pub document_id: Option<String>,
}

/// `POST /projects/:id/consistency/run`
pub async fn run_consistency(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let project_id = parse_id(&raw_id).ok_or_else(ApiError::project_not_found)?;
    let outcome = state.consistency.run_check(project_id).await?;

    let message = if outcome.documents_analyzed < 2 {
        "Not enough documents to perform consistency check"
    } else {
        "Consistency check complete"
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "documentsAnalyzed": outcome.documents_analyzed,
        "pairsAnalyzed": outcome.pairs_analyzed,
        "inconsistenciesFound": outcome.inconsistencies_found,
    })))
}

/// `GET /projects/:id/inconsistencies?documentId=`
pub async fn list_inconsistencies(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<InconsistencyQuery>,
) -> Result<Json<Value>, ApiError> {
    let project_id = parse_id(&raw_id).ok_or_else(ApiError::project_not_found)?;
    if state.store.fetch_project(project_id).await?.is_none() {
        return Err(ApiError::project_not_found());
    }

    let filter = query
        .document_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let document_id = match filter {
        None => None,
        Some(raw) => match parse_id(raw) {
            Some(id) => Some(id),
            // No document can have this id.
            None => return Ok(Json(json!({ "inconsistencies": [] }))),
        },
    };

    let inconsistencies = state
        .store
        .list_inconsistencies(project_id, document_id)
        .await?;
    Ok(Json(json!({ "inconsistencies": inconsistencies })))
}
