//! # concord-db
//!
//! PostgreSQL persistence layer for concord.
//!
//! This crate provides:
//! - Connection pool management
//! - Repositories for projects, documents, paragraphs, and inconsistencies
//! - The [`Database`] aggregate implementing `DocumentStore`
//! - Schema migrations (feature `migrations`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use concord_db::Database;
//! use concord_core::DocumentStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/concord").await?;
//!     db.migrate().await?;
//!
//!     let project = db.create_project("Master services agreement").await?;
//!     println!("Created project: {}", project.id);
//!     Ok(())
//! }
//! ```

pub mod documents;
pub mod inconsistencies;
pub mod paragraphs;
pub mod pool;
pub mod projects;

// Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

use async_trait::async_trait;
use uuid::Uuid;

pub use concord_core::*;

pub use documents::PgDocumentRepository;
pub use inconsistencies::PgInconsistencyRepository;
pub use paragraphs::PgParagraphRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use projects::PgProjectRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub projects: PgProjectRepository,
    pub documents: PgDocumentRepository,
    pub paragraphs: PgParagraphRepository,
    pub inconsistencies: PgInconsistencyRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            projects: PgProjectRepository::new(pool.clone()),
            documents: PgDocumentRepository::new(pool.clone()),
            paragraphs: PgParagraphRepository::new(pool.clone()),
            inconsistencies: PgInconsistencyRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Close all pooled connections, waiting for checked-out ones to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl DocumentStore for Database {
    async fn create_project(&self, name: &str) -> Result<Project> {
        self.projects.insert(name).await
    }

    async fn fetch_project(&self, id: Uuid) -> Result<Option<Project>> {
        self.projects.get(id).await
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        self.projects.list_with_counts().await
    }

    async fn create_document(&self, req: CreateDocumentRequest) -> Result<Document> {
        self.documents.insert(req).await
    }

    async fn fetch_document(&self, id: Uuid) -> Result<Option<Document>> {
        self.documents.get(id).await
    }

    async fn list_documents(&self, project_id: Uuid) -> Result<Vec<Document>> {
        self.documents.list_for_project(project_id).await
    }

    async fn list_ready_documents(&self, project_id: Uuid) -> Result<Vec<Document>> {
        self.documents.list_ready(project_id).await
    }

    async fn update_document_status(&self, id: Uuid, status: DocumentStatus) -> Result<()> {
        self.documents.update_status(id, status).await
    }

    async fn insert_paragraphs(
        &self,
        document_id: Uuid,
        paragraphs: &[ExtractedParagraph],
    ) -> Result<usize> {
        self.paragraphs.insert_batch(document_id, paragraphs).await
    }

    async fn list_paragraphs(&self, document_id: Uuid) -> Result<Vec<DocumentParagraph>> {
        self.paragraphs.list_for_document(document_id).await
    }

    async fn find_paragraph(
        &self,
        document_id: Uuid,
        paragraph_id: &str,
    ) -> Result<Option<DocumentParagraph>> {
        self.paragraphs
            .find_by_paragraph_id(document_id, paragraph_id)
            .await
    }

    async fn insert_inconsistency(&self, req: NewInconsistency) -> Result<Inconsistency> {
        self.inconsistencies.insert(req).await
    }

    async fn list_inconsistencies(
        &self,
        project_id: Uuid,
        document_id: Option<Uuid>,
    ) -> Result<Vec<Inconsistency>> {
        self.inconsistencies
            .list_for_project(project_id, document_id)
            .await
    }
}
