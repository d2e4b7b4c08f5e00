//! Core traits for concord abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// DOCUMENT STORE
// =============================================================================

/// Persistence contract for projects, documents, paragraphs, and inconsistencies.
///
/// Every method is an individual write or read; callers sequence them to get
/// the ordering guarantees they need.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // --- projects ---

    /// Create a project with the given (already validated) name.
    async fn create_project(&self, name: &str) -> Result<Project>;

    /// Fetch a project, `None` if it does not exist.
    async fn fetch_project(&self, id: Uuid) -> Result<Option<Project>>;

    /// List projects with document and inconsistency counts, newest first.
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>>;

    // --- documents ---

    /// Insert a document shell in state `UPLOADED`.
    async fn create_document(&self, req: CreateDocumentRequest) -> Result<Document>;

    /// Fetch a document, `None` if it does not exist.
    async fn fetch_document(&self, id: Uuid) -> Result<Option<Document>>;

    /// List all documents of a project, newest first.
    async fn list_documents(&self, project_id: Uuid) -> Result<Vec<Document>>;

    /// List `READY` documents of a project in a stable order (oldest first).
    async fn list_ready_documents(&self, project_id: Uuid) -> Result<Vec<Document>>;

    /// Move a document to `status`, failing with `InvalidStateTransition`
    /// if the state machine does not allow it.
    async fn update_document_status(&self, id: Uuid, status: DocumentStatus) -> Result<()>;

    // --- paragraphs ---

    /// Persist all paragraphs of a document as one batch.
    async fn insert_paragraphs(
        &self,
        document_id: Uuid,
        paragraphs: &[ExtractedParagraph],
    ) -> Result<usize>;

    /// List paragraphs of a document ordered by index.
    async fn list_paragraphs(&self, document_id: Uuid) -> Result<Vec<DocumentParagraph>>;

    /// Look up a paragraph by its document and external anchor (`p-<index>`).
    async fn find_paragraph(
        &self,
        document_id: Uuid,
        paragraph_id: &str,
    ) -> Result<Option<DocumentParagraph>>;

    // --- inconsistencies ---

    /// Append an immutable inconsistency record.
    async fn insert_inconsistency(&self, req: NewInconsistency) -> Result<Inconsistency>;

    /// List inconsistencies of a project, optionally restricted to those
    /// where `document_id` is source or target. Ordered by severity
    /// descending, then creation time descending.
    async fn list_inconsistencies(
        &self,
        project_id: Uuid,
        document_id: Option<Uuid>,
    ) -> Result<Vec<Inconsistency>>;
}

// =============================================================================
// ANALYSIS ENGINE
// =============================================================================

/// Client contract for the external Analysis Engine.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    /// Ask the engine to index a document's paragraphs for similarity search.
    async fn ingest_for_index(&self, project_id: Uuid, document_id: Uuid) -> Result<()>;

    /// Compare two documents and return the inconsistencies found.
    async fn analyze_pair(
        &self,
        project_id: Uuid,
        doc1_id: Uuid,
        doc2_id: Uuid,
    ) -> Result<Vec<EngineInconsistency>>;

    /// Engine identifier for logging.
    fn name(&self) -> &str;
}

// =============================================================================
// PARAGRAPH EXTRACTION
// =============================================================================

/// Converts raw document bytes into an ordered, addressable paragraph list.
///
/// Implementations are pure: identical bytes yield identical paragraphs.
pub trait ParagraphExtractor: Send + Sync {
    /// Fails with `MalformedDocument` if the bytes cannot be parsed and with
    /// `EmptyDocument` if no non-empty paragraph survives filtering.
    fn extract(&self, bytes: &[u8]) -> Result<Vec<ExtractedParagraph>>;

    /// File extension (lowercase, no dot) this extractor accepts.
    fn accepted_extension(&self) -> &str;
}
