//! Pairwise consistency workflow.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use concord_core::{
    AnalysisEngine, ConsistencyRunOutcome, Document, DocumentParagraph, DocumentStore,
    EngineInconsistency, Error, NewInconsistency, Result,
};

use super::run_guard::RunRegistry;

pub const RUN_IN_PROGRESS: &str = "A consistency check is already running for this project";

/// All unordered pairs `(i, j)` with `i < j`, in load order.
pub fn document_pairs(documents: &[Document]) -> Vec<(Uuid, Uuid)> {
    let mut pairs = Vec::with_capacity(documents.len() * documents.len().saturating_sub(1) / 2);
    for (i, first) in documents.iter().enumerate() {
        for second in &documents[i + 1..] {
            pairs.push((first.id, second.id));
        }
    }
    pairs
}

/// Runs the engine over every pair of `READY` documents in a project and
/// records what it finds.
#[derive(Clone)]
pub struct ConsistencyService {
    store: Arc<dyn DocumentStore>,
    engine: Arc<dyn AnalysisEngine>,
    runs: RunRegistry,
}

impl ConsistencyService {
    pub fn new(store: Arc<dyn DocumentStore>, engine: Arc<dyn AnalysisEngine>) -> Self {
        Self {
            store,
            engine,
            runs: RunRegistry::new(),
        }
    }

    /// Whether a run is in flight for `project_id`.
    pub fn is_running(&self, project_id: Uuid) -> bool {
        self.runs.is_running(project_id)
    }

    /// Analyze all pairs of `READY` documents in the project.
    ///
    /// Fewer than two documents is a successful no-op. An engine failure
    /// aborts the run; inconsistencies persisted for earlier pairs stay.
    pub async fn run_check(&self, project_id: Uuid) -> Result<ConsistencyRunOutcome> {
        if self.store.fetch_project(project_id).await?.is_none() {
            return Err(Error::ProjectNotFound(project_id));
        }

        let _permit = self
            .runs
            .try_acquire(project_id)
            .ok_or_else(|| Error::Conflict(RUN_IN_PROGRESS.to_string()))?;

        let documents = self.store.list_ready_documents(project_id).await?;
        if documents.len() < 2 {
            debug!(
                project_id = %project_id,
                documents = documents.len(),
                "Not enough READY documents for a consistency check"
            );
            return Ok(ConsistencyRunOutcome {
                documents_analyzed: documents.len(),
                pairs_analyzed: 0,
                inconsistencies_found: 0,
            });
        }

        let start = Instant::now();
        let pairs = document_pairs(&documents);
        info!(
            subsystem = "consistency",
            op = "run",
            project_id = %project_id,
            documents = documents.len(),
            pair_count = pairs.len(),
            "Running consistency check"
        );

        let mut pairs_analyzed = 0;
        let mut inconsistencies_found = 0;

        for (doc1_id, doc2_id) in pairs.iter().copied() {
            let found = match self.engine.analyze_pair(project_id, doc1_id, doc2_id).await {
                Ok(found) => found,
                Err(e) => {
                    error!(
                        subsystem = "consistency",
                        op = "analyze_pair",
                        project_id = %project_id,
                        doc1_id = %doc1_id,
                        doc2_id = %doc2_id,
                        pairs_done = pairs_analyzed,
                        inconsistency_count = inconsistencies_found,
                        error = %e,
                        "Pair analysis failed, aborting run"
                    );
                    return Err(e);
                }
            };
            pairs_analyzed += 1;

            for item in found {
                if let Some(record) = self.resolve(project_id, doc1_id, doc2_id, item).await {
                    self.store.insert_inconsistency(record).await?;
                    inconsistencies_found += 1;
                }
            }
        }

        info!(
            subsystem = "consistency",
            op = "run",
            project_id = %project_id,
            pair_count = pairs_analyzed,
            inconsistency_count = inconsistencies_found,
            duration_ms = start.elapsed().as_millis() as u64,
            "Consistency check complete"
        );

        Ok(ConsistencyRunOutcome {
            documents_analyzed: documents.len(),
            pairs_analyzed,
            inconsistencies_found,
        })
    }

    /// Look up one paragraph. A store failure skips the finding instead of
    /// aborting the run.
    async fn lookup_paragraph(
        &self,
        document_id: Uuid,
        paragraph_id: &str,
    ) -> Option<DocumentParagraph> {
        match self.store.find_paragraph(document_id, paragraph_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(
                    document_id = %document_id,
                    paragraph_id = %paragraph_id,
                    error = %e,
                    "Paragraph lookup failed"
                );
                None
            }
        }
    }

    /// Map an engine finding onto stored paragraphs. `None` means skip it.
    async fn resolve(
        &self,
        project_id: Uuid,
        doc1_id: Uuid,
        doc2_id: Uuid,
        item: EngineInconsistency,
    ) -> Option<NewInconsistency> {
        let source_document_id = item.source_document_id.unwrap_or(doc1_id);
        let target_document_id = item.target_document_id.unwrap_or(doc2_id);

        let in_pair = |id: Uuid| id == doc1_id || id == doc2_id;
        if !in_pair(source_document_id) || !in_pair(target_document_id) {
            warn!(
                project_id = %project_id,
                source_document_id = %source_document_id,
                target_document_id = %target_document_id,
                "Skipping inconsistency: document outside the analyzed pair"
            );
            return None;
        }

        let source = self
            .lookup_paragraph(source_document_id, &item.source_location.paragraph_id)
            .await;
        let target = self
            .lookup_paragraph(target_document_id, &item.target_location.paragraph_id)
            .await;

        let (source, target) = match (source, target) {
            (Some(s), Some(t)) => (s, t),
            _ => {
                warn!(
                    project_id = %project_id,
                    source_document_id = %source_document_id,
                    source_paragraph = %item.source_location.paragraph_id,
                    target_document_id = %target_document_id,
                    target_paragraph = %item.target_location.paragraph_id,
                    "Skipping inconsistency: paragraph not found"
                );
                return None;
            }
        };

        trace!(
            source_paragraph = source.index,
            target_paragraph = target.index,
            severity = %item.severity,
            "Resolved inconsistency"
        );

        Some(NewInconsistency {
            project_id,
            source_document_id,
            target_document_id,
            inconsistency_type: item.inconsistency_type,
            severity: item.severity,
            description: item.description,
            explanation: item.explanation,
            recommendation: item.recommendation,
            source_excerpt: item.source_excerpt,
            target_excerpt: item.target_excerpt,
            source_paragraph_index: source.index,
            source_start_offset: item.source_location.start_offset,
            source_end_offset: item.source_location.end_offset,
            target_paragraph_index: target.index,
            target_start_offset: item.target_location.start_offset,
            target_end_offset: item.target_location.end_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use concord_core::DocumentStatus;

    fn doc() -> Document {
        Document {
            id: Uuid::now_v7(),
            project_id: Uuid::nil(),
            title: "t".into(),
            original_filename: "t.docx".into(),
            status: DocumentStatus::Ready,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pair_count_is_n_choose_2() {
        for n in 0..7usize {
            let docs: Vec<Document> = (0..n).map(|_| doc()).collect();
            assert_eq!(document_pairs(&docs).len(), n * n.saturating_sub(1) / 2);
        }
    }

    #[test]
    fn test_pairs_follow_load_order() {
        let docs: Vec<Document> = (0..3).map(|_| doc()).collect();
        let pairs = document_pairs(&docs);
        assert_eq!(
            pairs,
            vec![
                (docs[0].id, docs[1].id),
                (docs[0].id, docs[2].id),
                (docs[1].id, docs[2].id),
            ]
        );
    }
}
