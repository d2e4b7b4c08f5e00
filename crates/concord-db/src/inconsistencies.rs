//! Inconsistency repository implementation.

use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use concord_core::{new_v7, DocumentRef, Error, Inconsistency, NewInconsistency, Result};

/// PostgreSQL repository for append-only inconsistency records.
#[derive(Clone)]
pub struct PgInconsistencyRepository {
    pool: Pool<Postgres>,
}

fn inconsistency_from_row(r: &PgRow) -> Result<Inconsistency> {
    let inconsistency_type: String = r.get("inconsistency_type");
    let severity: String = r.get("severity");
    let source_document_id: Uuid = r.get("source_document_id");
    let target_document_id: Uuid = r.get("target_document_id");

    Ok(Inconsistency {
        id: r.get("id"),
        project_id: r.get("project_id"),
        source_document_id,
        target_document_id,
        inconsistency_type: inconsistency_type.parse()?,
        severity: severity.parse()?,
        description: r.get("description"),
        explanation: r.get("explanation"),
        recommendation: r.get("recommendation"),
        source_excerpt: r.get("source_excerpt"),
        target_excerpt: r.get("target_excerpt"),
        source_paragraph_index: r.get("source_paragraph_index"),
        source_start_offset: r.get("source_start_offset"),
        source_end_offset: r.get("source_end_offset"),
        target_paragraph_index: r.get("target_paragraph_index"),
        target_start_offset: r.get("target_start_offset"),
        target_end_offset: r.get("target_end_offset"),
        created_at: r.get("created_at"),
        source_document: Some(DocumentRef {
            id: source_document_id,
            title: r.get("source_title"),
        }),
        target_document: Some(DocumentRef {
            id: target_document_id,
            title: r.get("target_title"),
        }),
    })
}

impl PgInconsistencyRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, req: NewInconsistency) -> Result<Inconsistency> {
        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO document_inconsistencies (
                id, project_id, source_document_id, target_document_id,
                inconsistency_type, severity, description, explanation, recommendation,
                source_excerpt, target_excerpt,
                source_paragraph_index, source_start_offset, source_end_offset,
                target_paragraph_index, target_start_offset, target_end_offset,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(id)
        .bind(req.project_id)
        .bind(req.source_document_id)
        .bind(req.target_document_id)
        .bind(req.inconsistency_type.as_str())
        .bind(req.severity.as_str())
        .bind(&req.description)
        .bind(&req.explanation)
        .bind(&req.recommendation)
        .bind(&req.source_excerpt)
        .bind(&req.target_excerpt)
        .bind(req.source_paragraph_index)
        .bind(req.source_start_offset)
        .bind(req.source_end_offset)
        .bind(req.target_paragraph_index)
        .bind(req.target_start_offset)
        .bind(req.target_end_offset)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Inconsistency {
            id,
            project_id: req.project_id,
            source_document_id: req.source_document_id,
            target_document_id: req.target_document_id,
            inconsistency_type: req.inconsistency_type,
            severity: req.severity,
            description: req.description,
            explanation: req.explanation,
            recommendation: req.recommendation,
            source_excerpt: req.source_excerpt,
            target_excerpt: req.target_excerpt,
            source_paragraph_index: req.source_paragraph_index,
            source_start_offset: req.source_start_offset,
            source_end_offset: req.source_end_offset,
            target_paragraph_index: req.target_paragraph_index,
            target_start_offset: req.target_start_offset,
            target_end_offset: req.target_end_offset,
            created_at: now,
            source_document: None,
            target_document: None,
        })
    }

    /// Inconsistencies of a project, most severe first, then newest first.
    ///
    /// With `document_id`, only rows where that document is source or target.
    pub async fn list_for_project(
        &self,
        project_id: Uuid,
        document_id: Option<Uuid>,
    ) -> Result<Vec<Inconsistency>> {
        let rows = sqlx::query(
            r#"
            SELECT i.*, s.title AS source_title, t.title AS target_title
            FROM document_inconsistencies i
            JOIN documents s ON s.id = i.source_document_id
            JOIN documents t ON t.id = i.target_document_id
            WHERE i.project_id = $1
              AND ($2::uuid IS NULL OR i.source_document_id = $2 OR i.target_document_id = $2)
            ORDER BY CASE i.severity
                         WHEN 'CRITICAL' THEN 4
                         WHEN 'HIGH' THEN 3
                         WHEN 'MEDIUM' THEN 2
                         ELSE 1
                     END DESC,
                     i.created_at DESC,
                     i.id DESC
            "#,
        )
        .bind(project_id)
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(inconsistency_from_row).collect()
    }
}
