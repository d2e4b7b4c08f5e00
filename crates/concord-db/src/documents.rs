//! Document repository implementation.

use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use concord_core::{new_v7, CreateDocumentRequest, Document, DocumentStatus, Error, Result};

const DOCUMENT_COLUMNS: &str =
    "id, project_id, title, original_filename, status, created_at, updated_at";

/// PostgreSQL repository for documents and their status machine.
#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: Pool<Postgres>,
}

fn document_from_row(r: &PgRow) -> Result<Document> {
    let status: String = r.get("status");
    Ok(Document {
        id: r.get("id"),
        project_id: r.get("project_id"),
        title: r.get("title"),
        original_filename: r.get("original_filename"),
        status: status.parse()?,
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

impl PgDocumentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a document shell in state `UPLOADED`.
    pub async fn insert(&self, req: CreateDocumentRequest) -> Result<Document> {
        let id = new_v7();
        let now = Utc::now();
        let status = DocumentStatus::Uploaded;

        sqlx::query(
            r#"
            INSERT INTO documents (id, project_id, title, original_filename, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(req.project_id)
        .bind(&req.title)
        .bind(&req.original_filename)
        .bind(status.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Document {
            id,
            project_id: req.project_id,
            title: req.title,
            original_filename: req.original_filename,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Document>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE id = $1",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(document_from_row).transpose()
    }

    /// All documents of a project, newest first.
    pub async fn list_for_project(&self, project_id: Uuid) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE project_id = $1 ORDER BY created_at DESC, id DESC",
            DOCUMENT_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(document_from_row).collect()
    }

    /// `READY` documents of a project, oldest first.
    pub async fn list_ready(&self, project_id: Uuid) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE project_id = $1 AND status = $2 ORDER BY created_at ASC, id ASC",
            DOCUMENT_COLUMNS
        ))
        .bind(project_id)
        .bind(DocumentStatus::Ready.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(document_from_row).collect()
    }

    /// Move a document out of `UPLOADED`.
    ///
    /// The update only applies while the row is still `UPLOADED`, so two
    /// racing writers cannot both succeed.
    pub async fn update_status(&self, id: Uuid, status: DocumentStatus) -> Result<()> {
        if !DocumentStatus::Uploaded.can_transition_to(status) {
            let current = self.current_status(id).await?;
            return Err(Error::InvalidStateTransition {
                id,
                from: current,
                to: status,
            });
        }

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET status = $2, updated_at = $3
            WHERE id = $1 AND status = $4
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(DocumentStatus::Uploaded.as_str())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            let current = self.current_status(id).await?;
            return Err(Error::InvalidStateTransition {
                id,
                from: current,
                to: status,
            });
        }

        debug!(
            subsystem = "database",
            component = "documents",
            op = "update_status",
            document_id = %id,
            status = status.as_str(),
            "Document status updated"
        );
        Ok(())
    }

    async fn current_status(&self, id: Uuid) -> Result<DocumentStatus> {
        let row = sqlx::query("SELECT status FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::DocumentNotFound(id))?;
        row.get::<String, _>("status").parse()
    }
}
