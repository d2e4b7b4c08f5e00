//! Wire types for the Analysis Engine API (snake_case JSON).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use concord_core::EngineInconsistency;

/// Body of `POST /embeddings/ingest-document`.
#[derive(Debug, Clone, Serialize)]
pub struct IngestDocumentRequest {
    pub project_id: Uuid,
    pub document_id: Uuid,
}

/// Body of `POST /consistency/analyze-pair`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzePairRequest {
    pub project_id: Uuid,
    pub doc1_id: Uuid,
    pub doc2_id: Uuid,
}

/// Response of `POST /consistency/analyze-pair`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzePairResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    /// Absent means none found. Records are decoded one at a time by
    /// [`AnalyzePairResponse::decode_inconsistencies`].
    #[serde(default)]
    pub inconsistencies: Vec<serde_json::Value>,
}

/// A record from `inconsistencies` that did not match the expected shape.
#[derive(Debug)]
pub struct RejectedRecord {
    pub position: usize,
    pub error: serde_json::Error,
}

impl AnalyzePairResponse {
    /// Decode each record independently so one malformed record does not
    /// discard its well-formed siblings.
    pub fn decode_inconsistencies(self) -> (Vec<EngineInconsistency>, Vec<RejectedRecord>) {
        let mut decoded = Vec::with_capacity(self.inconsistencies.len());
        let mut rejected = Vec::new();
        for (position, raw) in self.inconsistencies.into_iter().enumerate() {
            match serde_json::from_value::<EngineInconsistency>(raw) {
                Ok(item) => decoded.push(item),
                Err(error) => rejected.push(RejectedRecord { position, error }),
            }
        }
        (decoded, rejected)
    }
}

/// Error body the engine returns on failure. FastAPI uses `detail`,
/// application errors use `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl EngineErrorBody {
    /// Most specific human-readable detail available.
    pub fn detail_text(&self) -> Option<String> {
        if let Some(message) = self.message.as_ref().filter(|m| !m.is_empty()) {
            return Some(message.clone());
        }
        match self.detail.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
