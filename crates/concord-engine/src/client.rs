//! reqwest-backed Analysis Engine client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use concord_core::defaults::{ANALYSIS_ENGINE_TIMEOUT_SECS, ANALYSIS_ENGINE_URL};
use concord_core::{AnalysisEngine, EngineInconsistency, Error, Result};

use crate::types::{AnalyzePairRequest, AnalyzePairResponse, EngineErrorBody, IngestDocumentRequest};

/// Default Analysis Engine base URL.
pub const DEFAULT_ENGINE_URL: &str = ANALYSIS_ENGINE_URL;

/// Default request timeout in seconds. Pair analysis can run for minutes.
pub const DEFAULT_TIMEOUT_SECS: u64 = ANALYSIS_ENGINE_TIMEOUT_SECS;

const INGEST_PATH: &str = "/embeddings/ingest-document";
const ANALYZE_PAIR_PATH: &str = "/consistency/analyze-pair";

/// Configuration for the Analysis Engine client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Base URL of the engine, without trailing path.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENGINE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    /// Read `ANALYSIS_ENGINE_URL` and `ANALYSIS_ENGINE_TIMEOUT_SECS`,
    /// falling back to defaults for unset or unparseable values.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ANALYSIS_ENGINE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ENGINE_URL.to_string()),
            timeout_seconds: std::env::var("ANALYSIS_ENGINE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// HTTP client for the Analysis Engine.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct AnalysisEngineClient {
    client: Client,
    config: EngineConfig,
}

impl AnalysisEngineClient {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "engine",
            component = "client",
            op = "init",
            base_url = %config.base_url,
            timeout_secs = config.timeout_seconds,
            "Analysis engine client initialized"
        );

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(EngineConfig::from_env())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B, context: &str) -> Result<Response> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::AnalysisEngine(format!("{}: {}", context, e)))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body: EngineErrorBody = response.json().await.unwrap_or_default();
        let detail = body
            .detail_text()
            .unwrap_or_else(|| format!("engine returned {}", status));
        Err(Error::AnalysisEngine(format!("{}: {}", context, detail)))
    }
}

#[async_trait]
impl AnalysisEngine for AnalysisEngineClient {
    async fn ingest_for_index(&self, project_id: Uuid, document_id: Uuid) -> Result<()> {
        let start = Instant::now();
        debug!(
            subsystem = "engine",
            op = "ingest_document",
            project_id = %project_id,
            document_id = %document_id,
            "Requesting document ingestion"
        );

        let request = IngestDocumentRequest {
            project_id,
            document_id,
        };
        self.post(INGEST_PATH, &request, "Failed to ingest document")
            .await?;

        info!(
            subsystem = "engine",
            op = "ingest_document",
            document_id = %document_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Document ingested by analysis engine"
        );
        Ok(())
    }

    async fn analyze_pair(
        &self,
        project_id: Uuid,
        doc1_id: Uuid,
        doc2_id: Uuid,
    ) -> Result<Vec<EngineInconsistency>> {
        let start = Instant::now();
        debug!(
            subsystem = "engine",
            op = "analyze_pair",
            project_id = %project_id,
            doc1_id = %doc1_id,
            doc2_id = %doc2_id,
            "Requesting pair analysis"
        );

        let request = AnalyzePairRequest {
            project_id,
            doc1_id,
            doc2_id,
        };
        let response = self
            .post(ANALYZE_PAIR_PATH, &request, "Failed to analyze document pair")
            .await?;

        let body: AnalyzePairResponse = response.json().await.map_err(|e| {
            Error::AnalysisEngine(format!(
                "Failed to analyze document pair: invalid response: {}",
                e
            ))
        })?;

        if body.success == Some(false) {
            warn!(
                subsystem = "engine",
                op = "analyze_pair",
                message = body.message.as_deref().unwrap_or(""),
                "Analysis engine reported an unsuccessful pair analysis"
            );
        }

        let (found, rejected) = body.decode_inconsistencies();
        for record in &rejected {
            warn!(
                subsystem = "engine",
                op = "analyze_pair",
                doc1_id = %doc1_id,
                doc2_id = %doc2_id,
                position = record.position,
                error = %record.error,
                "Skipping malformed inconsistency record"
            );
        }

        info!(
            subsystem = "engine",
            op = "analyze_pair",
            doc1_id = %doc1_id,
            doc2_id = %doc2_id,
            inconsistency_count = found.len(),
            rejected_count = rejected.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Pair analysis complete"
        );
        Ok(found)
    }

    fn name(&self) -> &str {
        "analysis-engine"
    }
}
