//! Document ingestion workflow.
//!
//! `UPLOADED -> READY` on success, `UPLOADED -> ERROR` on any failure after
//! the document row exists. Paragraphs are committed before the status flips
//! to `READY`, so any reader that observes `READY` sees the complete
//! paragraph set.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use concord_core::{
    AnalysisEngine, CreateDocumentRequest, DocumentStatus, DocumentStore, Error, IngestOutcome,
    ParagraphExtractor, Result,
};

/// Validates, extracts, and persists uploaded documents.
#[derive(Clone)]
pub struct IngestionService {
    store: Arc<dyn DocumentStore>,
    extractor: Arc<dyn ParagraphExtractor>,
    engine: Arc<dyn AnalysisEngine>,
}

/// Title for an uploaded file: the filename minus its extension.
pub fn title_from_filename(filename: &str, extension: &str) -> String {
    let suffix_len = extension.len() + 1;
    if has_extension(filename, extension) {
        filename[..filename.len() - suffix_len].to_string()
    } else {
        filename.to_string()
    }
}

/// Case-insensitive `.<extension>` suffix check.
pub fn has_extension(filename: &str, extension: &str) -> bool {
    let suffix_len = extension.len() + 1;
    if filename.len() < suffix_len || !filename.is_char_boundary(filename.len() - suffix_len) {
        return false;
    }
    let suffix = &filename[filename.len() - suffix_len..];
    suffix.starts_with('.') && suffix[1..].eq_ignore_ascii_case(extension)
}

impl IngestionService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        extractor: Arc<dyn ParagraphExtractor>,
        engine: Arc<dyn AnalysisEngine>,
    ) -> Self {
        Self {
            store,
            extractor,
            engine,
        }
    }

    /// Ingest one uploaded file into a project.
    ///
    /// On success the Analysis Engine is asked to index the document in a
    /// detached task; its outcome is only logged.
    pub async fn ingest(
        &self,
        project_id: Uuid,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<IngestOutcome> {
        let start = Instant::now();

        if self.store.fetch_project(project_id).await?.is_none() {
            return Err(Error::ProjectNotFound(project_id));
        }

        let extension = self.extractor.accepted_extension().to_string();
        if !has_extension(filename, &extension) {
            debug!(
                project_id = %project_id,
                filename = %filename,
                "Rejected upload with unsupported extension"
            );
            return Err(Error::UnsupportedFileType(format!(
                "Invalid file type. Only .{} files are supported",
                extension
            )));
        }

        info!(
            subsystem = "ingestion",
            op = "upload",
            project_id = %project_id,
            filename = %filename,
            byte_len = bytes.len(),
            "Uploading document"
        );

        let document = self
            .store
            .create_document(CreateDocumentRequest {
                project_id,
                title: title_from_filename(filename, &extension),
                original_filename: filename.to_string(),
            })
            .await?;

        let paragraphs_count = match self.extract_and_store(document.id, bytes).await {
            Ok(count) => count,
            Err(e) => {
                warn!(
                    subsystem = "ingestion",
                    document_id = %document.id,
                    error = %e,
                    "Ingestion failed, marking document as ERROR"
                );
                if let Err(status_err) = self
                    .store
                    .update_document_status(document.id, DocumentStatus::Error)
                    .await
                {
                    error!(
                        document_id = %document.id,
                        error = %status_err,
                        "Failed to mark document as ERROR"
                    );
                }
                return Err(e);
            }
        };

        info!(
            subsystem = "ingestion",
            op = "ready",
            document_id = %document.id,
            paragraph_count = paragraphs_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Document ready"
        );

        self.spawn_index_ingestion(project_id, document.id);

        Ok(IngestOutcome {
            document_id: document.id,
            title: document.title,
            paragraphs_count,
        })
    }

    /// Extract paragraphs, persist them, then flip the document to `READY`.
    async fn extract_and_store(&self, document_id: Uuid, bytes: Vec<u8>) -> Result<usize> {
        let extractor = Arc::clone(&self.extractor);
        let paragraphs = tokio::task::spawn_blocking(move || extractor.extract(&bytes))
            .await
            .map_err(|e| Error::Internal(format!("extraction task failed: {}", e)))??;

        let count = self.store.insert_paragraphs(document_id, &paragraphs).await?;
        self.store
            .update_document_status(document_id, DocumentStatus::Ready)
            .await?;
        Ok(count)
    }

    fn spawn_index_ingestion(&self, project_id: Uuid, document_id: Uuid) {
        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move {
            match engine.ingest_for_index(project_id, document_id).await {
                Ok(()) => info!(
                    subsystem = "ingestion",
                    op = "index",
                    engine = engine.name(),
                    document_id = %document_id,
                    "Document indexed by analysis engine"
                ),
                Err(e) => error!(
                    subsystem = "ingestion",
                    op = "index",
                    engine = engine.name(),
                    document_id = %document_id,
                    error = %e,
                    "Background index ingestion failed"
                ),
            }
        });
    }
}
