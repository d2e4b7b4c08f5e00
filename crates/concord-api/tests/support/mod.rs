//! Shared fakes for the API and service tests: an in-memory document store,
//! a scripted Analysis Engine, and a `.docx` builder.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use concord_core::{
    AnalysisEngine, CreateDocumentRequest, Document, DocumentParagraph, DocumentRef,
    DocumentStatus, DocumentStore, EngineInconsistency, Error, ExtractedParagraph, Inconsistency,
    InconsistencyType, NewInconsistency, ParagraphLocation, Project, ProjectSummary, Result,
    Severity,
};

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

#[derive(Default)]
struct StoreState {
    projects: Vec<Project>,
    documents: Vec<Document>,
    paragraphs: Vec<DocumentParagraph>,
    inconsistencies: Vec<Inconsistency>,
}

/// `DocumentStore` over vectors. Insertion order stands in for creation time.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    /// Makes `insert_paragraphs` fail, as a dropped connection would.
    pub fail_paragraph_inserts: AtomicBool,
    /// Makes `find_paragraph` fail, as a dropped connection would.
    pub fail_paragraph_lookups: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn document_status(&self, id: Uuid) -> Option<DocumentStatus> {
        let state = self.state.lock().unwrap();
        state.documents.iter().find(|d| d.id == id).map(|d| d.status)
    }

    pub fn document_count(&self) -> usize {
        self.state.lock().unwrap().documents.len()
    }

    pub fn inconsistency_count(&self) -> usize {
        self.state.lock().unwrap().inconsistencies.len()
    }

    /// Seed a READY document with the given paragraph texts.
    pub async fn seed_ready_document(&self, project_id: Uuid, title: &str, texts: &[&str]) -> Uuid {
        let doc = self
            .create_document(CreateDocumentRequest {
                project_id,
                title: title.to_string(),
                original_filename: format!("{}.docx", title),
            })
            .await
            .unwrap();
        let paragraphs: Vec<ExtractedParagraph> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| ExtractedParagraph::new(i, t.to_string(), t.to_string()))
            .collect();
        self.insert_paragraphs(doc.id, &paragraphs).await.unwrap();
        self.update_document_status(doc.id, DocumentStatus::Ready)
            .await
            .unwrap();
        doc.id
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_project(&self, name: &str) -> Result<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::now_v7(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().projects.push(project.clone());
        Ok(project)
    }

    async fn fetch_project(&self, id: Uuid) -> Result<Option<Project>> {
        let state = self.state.lock().unwrap();
        Ok(state.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .projects
            .iter()
            .rev()
            .map(|p| ProjectSummary {
                id: p.id,
                name: p.name.clone(),
                created_at: p.created_at,
                updated_at: p.updated_at,
                documents_count: state
                    .documents
                    .iter()
                    .filter(|d| d.project_id == p.id)
                    .count() as i64,
                inconsistencies_count: state
                    .inconsistencies
                    .iter()
                    .filter(|i| i.project_id == p.id)
                    .count() as i64,
            })
            .collect())
    }

    async fn create_document(&self, req: CreateDocumentRequest) -> Result<Document> {
        let mut state = self.state.lock().unwrap();
        if !state.projects.iter().any(|p| p.id == req.project_id) {
            return Err(Error::ProjectNotFound(req.project_id));
        }
        let now = Utc::now();
        let document = Document {
            id: Uuid::now_v7(),
            project_id: req.project_id,
            title: req.title,
            original_filename: req.original_filename,
            status: DocumentStatus::Uploaded,
            created_at: now,
            updated_at: now,
        };
        state.documents.push(document.clone());
        Ok(document)
    }

    async fn fetch_document(&self, id: Uuid) -> Result<Option<Document>> {
        let state = self.state.lock().unwrap();
        Ok(state.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn list_documents(&self, project_id: Uuid) -> Result<Vec<Document>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .documents
            .iter()
            .rev()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_ready_documents(&self, project_id: Uuid) -> Result<Vec<Document>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .documents
            .iter()
            .filter(|d| d.project_id == project_id && d.status == DocumentStatus::Ready)
            .cloned()
            .collect())
    }

    async fn update_document_status(&self, id: Uuid, status: DocumentStatus) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let document = state
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(Error::DocumentNotFound(id))?;
        if !document.status.can_transition_to(status) {
            return Err(Error::InvalidStateTransition {
                id,
                from: document.status,
                to: status,
            });
        }
        document.status = status;
        document.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_paragraphs(
        &self,
        document_id: Uuid,
        paragraphs: &[ExtractedParagraph],
    ) -> Result<usize> {
        if self.fail_paragraph_inserts.load(Ordering::SeqCst) {
            return Err(Error::Internal("connection reset".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        for p in paragraphs {
            state.paragraphs.push(DocumentParagraph {
                id: Uuid::now_v7(),
                document_id,
                index: p.index as i32,
                paragraph_id: p.paragraph_id.clone(),
                text: p.text.clone(),
                html: p.html.clone(),
            });
        }
        Ok(paragraphs.len())
    }

    async fn list_paragraphs(&self, document_id: Uuid) -> Result<Vec<DocumentParagraph>> {
        let state = self.state.lock().unwrap();
        let mut paragraphs: Vec<DocumentParagraph> = state
            .paragraphs
            .iter()
            .filter(|p| p.document_id == document_id)
            .cloned()
            .collect();
        paragraphs.sort_by_key(|p| p.index);
        Ok(paragraphs)
    }

    async fn find_paragraph(
        &self,
        document_id: Uuid,
        paragraph_id: &str,
    ) -> Result<Option<DocumentParagraph>> {
        if self.fail_paragraph_lookups.load(Ordering::SeqCst) {
            return Err(Error::Internal("connection reset".to_string()));
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .paragraphs
            .iter()
            .find(|p| p.document_id == document_id && p.paragraph_id == paragraph_id)
            .cloned())
    }

    async fn insert_inconsistency(&self, req: NewInconsistency) -> Result<Inconsistency> {
        let inconsistency = Inconsistency {
            id: Uuid::now_v7(),
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
            created_at: Utc::now(),
            source_document: None,
            target_document: None,
        };
        self.state
            .lock()
            .unwrap()
            .inconsistencies
            .push(inconsistency.clone());
        Ok(inconsistency)
    }

    async fn list_inconsistencies(
        &self,
        project_id: Uuid,
        document_id: Option<Uuid>,
    ) -> Result<Vec<Inconsistency>> {
        let state = self.state.lock().unwrap();
        let reference = |id: Uuid| {
            state.documents.iter().find(|d| d.id == id).map(|d| DocumentRef {
                id: d.id,
                title: d.title.clone(),
            })
        };

        // Newest first, then a stable sort by severity keeps recency within a rank.
        let mut listed: Vec<Inconsistency> = state
            .inconsistencies
            .iter()
            .rev()
            .filter(|i| i.project_id == project_id)
            .filter(|i| match document_id {
                Some(doc) => i.source_document_id == doc || i.target_document_id == doc,
                None => true,
            })
            .map(|i| Inconsistency {
                source_document: reference(i.source_document_id),
                target_document: reference(i.target_document_id),
                ..i.clone()
            })
            .collect();
        listed.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank()));
        Ok(listed)
    }
}

// =============================================================================
// SCRIPTED ENGINE
// =============================================================================

/// `AnalysisEngine` that replays scripted per-pair results and records calls.
#[derive(Default)]
pub struct ScriptedEngine {
    pub responses: Mutex<HashMap<(Uuid, Uuid), std::result::Result<Vec<EngineInconsistency>, String>>>,
    pub pair_calls: Mutex<Vec<(Uuid, Uuid)>>,
    pub ingest_calls: Mutex<Vec<Uuid>>,
    pub fail_ingest: bool,
    /// Notified each time `analyze_pair` starts.
    pub analyze_started: Arc<Notify>,
    /// When set, `analyze_pair` waits on it before answering.
    pub analyze_gate: Option<Arc<Notify>>,
    /// When set, `ingest_for_index` waits on it before answering.
    pub ingest_gate: Option<Arc<Notify>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, doc1: Uuid, doc2: Uuid, found: Vec<EngineInconsistency>) {
        self.responses.lock().unwrap().insert((doc1, doc2), Ok(found));
    }

    pub fn fail(&self, doc1: Uuid, doc2: Uuid, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert((doc1, doc2), Err(message.to_string()));
    }

    pub fn pair_calls(&self) -> Vec<(Uuid, Uuid)> {
        self.pair_calls.lock().unwrap().clone()
    }

    pub fn ingest_calls(&self) -> Vec<Uuid> {
        self.ingest_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisEngine for ScriptedEngine {
    async fn ingest_for_index(&self, _project_id: Uuid, document_id: Uuid) -> Result<()> {
        if let Some(gate) = &self.ingest_gate {
            gate.notified().await;
        }
        self.ingest_calls.lock().unwrap().push(document_id);
        if self.fail_ingest {
            return Err(Error::AnalysisEngine(
                "Failed to ingest document: connection refused".to_string(),
            ));
        }
        Ok(())
    }

    async fn analyze_pair(
        &self,
        _project_id: Uuid,
        doc1_id: Uuid,
        doc2_id: Uuid,
    ) -> Result<Vec<EngineInconsistency>> {
        self.pair_calls.lock().unwrap().push((doc1_id, doc2_id));
        self.analyze_started.notify_one();
        if let Some(gate) = &self.analyze_gate {
            gate.notified().await;
        }
        let scripted = self
            .responses
            .lock()
            .unwrap()
            .get(&(doc1_id, doc2_id))
            .cloned();
        match scripted {
            Some(Ok(found)) => Ok(found),
            Some(Err(message)) => Err(Error::AnalysisEngine(format!(
                "Failed to analyze document pair: {}",
                message
            ))),
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// An engine finding between two paragraph anchors, document ids omitted.
pub fn finding(source_paragraph: &str, target_paragraph: &str, severity: Severity) -> EngineInconsistency {
    EngineInconsistency {
        source_document_id: None,
        target_document_id: None,
        inconsistency_type: InconsistencyType::Contradiction,
        severity,
        description: format!("{} disagrees with {}", source_paragraph, target_paragraph),
        explanation: "Payment terms differ".to_string(),
        recommendation: "Align the payment terms".to_string(),
        source_excerpt: "30 days".to_string(),
        target_excerpt: "45 days".to_string(),
        source_location: ParagraphLocation {
            paragraph_id: source_paragraph.to_string(),
            start_offset: 0,
            end_offset: 7,
        },
        target_location: ParagraphLocation {
            paragraph_id: target_paragraph.to_string(),
            start_offset: 0,
            end_offset: 7,
        },
    }
}

// =============================================================================
// DOCX BUILDER
// =============================================================================

const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A minimal `.docx` package with one `<w:p>` per entry. Blank entries
/// become empty paragraphs.
pub fn docx_with_paragraphs(texts: &[&str]) -> Vec<u8> {
    let body: String = texts
        .iter()
        .map(|t| {
            if t.is_empty() {
                "<w:p/>".to_string()
            } else {
                format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", t)
            }
        })
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W}"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}
