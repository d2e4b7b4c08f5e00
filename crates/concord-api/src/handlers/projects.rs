//! Project handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::parse_id;
use crate::{ApiError, AppState};

pub const PROJECT_NAME_REQUIRED: &str = "Project name is required";

#[derive(Debug, Deserialize)]
pub struct CreateProjectBody {
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET /projects`: newest first, with document and inconsistency counts.
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let projects = state.store.list_projects().await?;
    Ok(Json(json!({ "projects": projects })))
}

/// `POST /projects`
///
/// A missing, non-string, or blank `name` (or an unparseable body) is a 400.
pub async fn create_project(
    State(state): State<AppState>,
    body: Result<Json<CreateProjectBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let name = body
        .ok()
        .and_then(|Json(body)| body.name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest(PROJECT_NAME_REQUIRED.to_string()))?;

    let project = state.store.create_project(&name).await?;
    info!(
        subsystem = "api",
        op = "create_project",
        project_id = %project.id,
        "Project created"
    );
    Ok((StatusCode::CREATED, Json(json!({ "project": project }))))
}

/// `GET /projects/:id/documents`: newest first.
pub async fn list_documents(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let project_id = parse_id(&raw_id).ok_or_else(ApiError::project_not_found)?;
    if state.store.fetch_project(project_id).await?.is_none() {
        return Err(ApiError::project_not_found());
    }
    let documents = state.store.list_documents(project_id).await?;
    Ok(Json(json!({ "documents": documents })))
}
