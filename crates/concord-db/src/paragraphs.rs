//! Paragraph repository implementation.

use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, trace};
use uuid::Uuid;

use concord_core::{new_v7, DocumentParagraph, Error, ExtractedParagraph, Result};

/// PostgreSQL repository for document paragraphs.
#[derive(Clone)]
pub struct PgParagraphRepository {
    pool: Pool<Postgres>,
}

fn paragraph_from_row(r: &PgRow) -> DocumentParagraph {
    DocumentParagraph {
        id: r.get("id"),
        document_id: r.get("document_id"),
        index: r.get("index"),
        paragraph_id: r.get("paragraph_id"),
        text: r.get("text"),
        html: r.get("html"),
    }
}

impl PgParagraphRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert every paragraph of a document in one transaction.
    ///
    /// Either all rows become visible or none do.
    pub async fn insert_batch(
        &self,
        document_id: Uuid,
        paragraphs: &[ExtractedParagraph],
    ) -> Result<usize> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        for paragraph in paragraphs {
            let index = i32::try_from(paragraph.index).map_err(|_| {
                Error::InvalidInput(format!("paragraph index {} out of range", paragraph.index))
            })?;
            trace!(
                document_id = %document_id,
                paragraph_id = %paragraph.paragraph_id,
                "Inserting paragraph"
            );
            sqlx::query(
                r#"
                INSERT INTO document_paragraphs (id, document_id, "index", paragraph_id, text, html)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(new_v7())
            .bind(document_id)
            .bind(index)
            .bind(&paragraph.paragraph_id)
            .bind(&paragraph.text)
            .bind(&paragraph.html)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "paragraphs",
            op = "insert_batch",
            document_id = %document_id,
            paragraph_count = paragraphs.len(),
            "Paragraphs persisted"
        );
        Ok(paragraphs.len())
    }

    /// Paragraphs of a document ordered by index.
    pub async fn list_for_document(&self, document_id: Uuid) -> Result<Vec<DocumentParagraph>> {
        let rows = sqlx::query(
            r#"
            SELECT id, document_id, "index", paragraph_id, text, html
            FROM document_paragraphs
            WHERE document_id = $1
            ORDER BY "index" ASC
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(paragraph_from_row).collect())
    }

    /// Look up a paragraph by its external anchor.
    pub async fn find_by_paragraph_id(
        &self,
        document_id: Uuid,
        paragraph_id: &str,
    ) -> Result<Option<DocumentParagraph>> {
        let row = sqlx::query(
            r#"
            SELECT id, document_id, "index", paragraph_id, text, html
            FROM document_paragraphs
            WHERE document_id = $1 AND paragraph_id = $2
            "#,
        )
        .bind(document_id)
        .bind(paragraph_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(paragraph_from_row))
    }
}
