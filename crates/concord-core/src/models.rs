//! Core data models for concord.
//!
//! These types are shared across all concord crates and represent the
//! domain entities plus the Analysis Engine wire shapes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::PARAGRAPH_ID_PREFIX;
use crate::error::Error;

// =============================================================================
// PROJECT TYPES
// =============================================================================

/// Top-level grouping of related documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project with owned-entity counts, used for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub documents_count: i64,
    pub inconsistencies_count: i64,
}

// =============================================================================
// DOCUMENT TYPES
// =============================================================================

/// Lifecycle of an uploaded document.
///
/// Forward-only: `UPLOADED -> READY` or `UPLOADED -> ERROR`, both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Uploaded,
    Ready,
    Error,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Uploaded => "UPLOADED",
            DocumentStatus::Ready => "READY",
            DocumentStatus::Error => "ERROR",
        }
    }

    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        matches!(
            (self, next),
            (DocumentStatus::Uploaded, DocumentStatus::Ready)
                | (DocumentStatus::Uploaded, DocumentStatus::Error)
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPLOADED" => Ok(DocumentStatus::Uploaded),
            "READY" => Ok(DocumentStatus::Ready),
            "ERROR" => Ok(DocumentStatus::Error),
            other => Err(Error::Serialization(format!(
                "unknown document status '{}'",
                other
            ))),
        }
    }
}

/// One uploaded rich-text file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub project_id: Uuid,
    /// Filename with the extension stripped.
    pub title: String,
    pub original_filename: String,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for creating a document shell in state `UPLOADED`.
#[derive(Debug, Clone)]
pub struct CreateDocumentRequest {
    pub project_id: Uuid,
    pub title: String,
    pub original_filename: String,
}

/// Minimal document view embedded in content and inconsistency responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
    pub id: Uuid,
    pub title: String,
    pub status: DocumentStatus,
}

/// `{id, title}` reference to a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub id: Uuid,
    pub title: String,
}

/// A document with its paragraphs ordered by index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContent {
    pub document: DocumentHeader,
    pub paragraphs: Vec<DocumentParagraph>,
}

// =============================================================================
// PARAGRAPH TYPES
// =============================================================================

/// Build the external anchor for a paragraph index (`p-<index>`).
pub fn paragraph_id_for(index: usize) -> String {
    format!("{}{}", PARAGRAPH_ID_PREFIX, index)
}

/// Paragraph produced by extraction, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedParagraph {
    /// Zero-based, dense position within the document.
    pub index: usize,
    /// External contract key, `p-<index>`.
    pub paragraph_id: String,
    pub text: String,
    pub html: String,
}

impl ExtractedParagraph {
    pub fn new(index: usize, text: String, html: String) -> Self {
        Self {
            index,
            paragraph_id: paragraph_id_for(index),
            text,
            html,
        }
    }
}

/// A persisted paragraph of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentParagraph {
    pub id: Uuid,
    pub document_id: Uuid,
    pub index: i32,
    pub paragraph_id: String,
    pub text: String,
    pub html: String,
}

// =============================================================================
// INCONSISTENCY TYPES
// =============================================================================

/// Kind of disagreement the Analysis Engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InconsistencyType {
    Contradiction,
    MissingRequirement,
    ConflictingDefinition,
    InconsistentScope,
    DataMismatch,
}

impl InconsistencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InconsistencyType::Contradiction => "CONTRADICTION",
            InconsistencyType::MissingRequirement => "MISSING_REQUIREMENT",
            InconsistencyType::ConflictingDefinition => "CONFLICTING_DEFINITION",
            InconsistencyType::InconsistentScope => "INCONSISTENT_SCOPE",
            InconsistencyType::DataMismatch => "DATA_MISMATCH",
        }
    }
}

impl fmt::Display for InconsistencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InconsistencyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONTRADICTION" => Ok(InconsistencyType::Contradiction),
            "MISSING_REQUIREMENT" => Ok(InconsistencyType::MissingRequirement),
            "CONFLICTING_DEFINITION" => Ok(InconsistencyType::ConflictingDefinition),
            "INCONSISTENT_SCOPE" => Ok(InconsistencyType::InconsistentScope),
            "DATA_MISMATCH" => Ok(InconsistencyType::DataMismatch),
            other => Err(Error::Serialization(format!(
                "unknown inconsistency type '{}'",
                other
            ))),
        }
    }
}

/// Severity of an inconsistency, ordered `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Numeric rank used for SQL ordering (higher is more severe).
    pub fn rank(&self) -> i32 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            "CRITICAL" => Ok(Severity::Critical),
            other => Err(Error::Serialization(format!("unknown severity '{}'", other))),
        }
    }
}

/// A persisted, immutable inconsistency between two documents of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inconsistency {
    pub id: Uuid,
    pub project_id: Uuid,
    pub source_document_id: Uuid,
    pub target_document_id: Uuid,
    pub inconsistency_type: InconsistencyType,
    pub severity: Severity,
    pub description: String,
    pub explanation: String,
    pub recommendation: String,
    pub source_excerpt: String,
    pub target_excerpt: String,
    pub source_paragraph_index: i32,
    pub source_start_offset: i32,
    pub source_end_offset: i32,
    pub target_paragraph_index: i32,
    pub target_start_offset: i32,
    pub target_end_offset: i32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_document: Option<DocumentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_document: Option<DocumentRef>,
}

/// Request for appending an inconsistency record.
#[derive(Debug, Clone)]
pub struct NewInconsistency {
    pub project_id: Uuid,
    pub source_document_id: Uuid,
    pub target_document_id: Uuid,
    pub inconsistency_type: InconsistencyType,
    pub severity: Severity,
    pub description: String,
    pub explanation: String,
    pub recommendation: String,
    pub source_excerpt: String,
    pub target_excerpt: String,
    pub source_paragraph_index: i32,
    pub source_start_offset: i32,
    pub source_end_offset: i32,
    pub target_paragraph_index: i32,
    pub target_start_offset: i32,
    pub target_end_offset: i32,
}

// =============================================================================
// ANALYSIS ENGINE TYPES
// =============================================================================

/// Position of an excerpt inside a paragraph, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphLocation {
    pub paragraph_id: String,
    pub start_offset: i32,
    pub end_offset: i32,
}

/// One inconsistency as returned by the engine's pair analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineInconsistency {
    /// Falls back to the pair's first document when the engine omits it.
    #[serde(default)]
    pub source_document_id: Option<Uuid>,
    /// Falls back to the pair's second document when the engine omits it.
    #[serde(default)]
    pub target_document_id: Option<Uuid>,
    pub inconsistency_type: InconsistencyType,
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub recommendation: String,
    pub source_excerpt: String,
    pub target_excerpt: String,
    pub source_location: ParagraphLocation,
    pub target_location: ParagraphLocation,
}

// =============================================================================
// WORKFLOW OUTCOMES
// =============================================================================

/// Result of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    pub document_id: Uuid,
    pub title: String,
    pub paragraphs_count: usize,
}

/// Result of a consistency run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyRunOutcome {
    /// READY documents considered by the run.
    pub documents_analyzed: usize,
    pub pairs_analyzed: usize,
    pub inconsistencies_found: usize,
}
