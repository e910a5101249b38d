use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CaseSummary, RiskLabel};

/// Suspicious message submitted for analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub message: String,
    /// Overrides the configured number of matches.
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl AnalyzeRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            top_k: None,
        }
    }

    pub fn with_top_k(mut self, top_k: Option<usize>) -> Self {
        self.top_k = top_k;
        self
    }
}

/// One ranked known case, annotated with its risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDto {
    pub rank: usize,
    pub case_id: Uuid,
    pub case: String,
    pub label: String,
    pub score: f32,
    pub risk: RiskLabel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub message: String,
    pub model: String,
    pub matches: Vec<MatchDto>,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResponse {
    /// The match with the highest similarity, if any case was found.
    pub fn top_match(&self) -> Option<&MatchDto> {
        self.matches.first()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseListResponse {
    pub items: Vec<CaseSummary>,
}

/// Health/readiness report for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatusResponse {
    pub ok: bool,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingBackendOption {
    pub id: String,
    pub label: String,
    pub description: String,
    pub model: String,
    pub dimensions: Option<usize>,
    pub feature_gated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingBackendListResponse {
    pub active: String,
    pub options: Vec<EmbeddingBackendOption>,
}
