use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    application::dtos::{
        AnalysisResponse, AnalyzeRequest, CaseListResponse, HealthStatusResponse, MatchDto,
    },
    domain::{classify, rank, Case, CaseEmbedding, CaseSeed, DomainError},
};

const MAX_MESSAGE_CHARS: usize = 4_000;

/// High level configuration shared by the service and its adapters.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub embedding_model: String,
    pub default_top_k: usize,
    pub max_top_k: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            embedding_model: "fraudapt/simple-hash".into(),
            default_top_k: 3,
            max_top_k: 32,
        }
    }
}

impl ServiceConfig {
    pub fn new(embedding_model: impl Into<String>, default_top_k: usize, max_top_k: usize) -> Self {
        let max_top_k = max_top_k.max(1);
        Self {
            embedding_model: embedding_model.into(),
            default_top_k: default_top_k.clamp(1, max_top_k),
            max_top_k,
        }
    }

    pub fn with_model(embedding_model: impl Into<String>) -> Self {
        let defaults = Self::default();
        Self::new(embedding_model, defaults.default_top_k, defaults.max_top_k)
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}

/// Abstraction over any embedding engine (hashing, FastEmbed, remote model, etc).
pub trait EmbeddingEngine: Send + Sync {
    fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>, DomainError>;

    fn dims(&self, _model: &str) -> Option<usize> {
        None
    }
}

/// Contract for the corpus of known fraud cases.
///
/// A real vector index or a brute-force in-memory scan can both satisfy it;
/// ranking only needs `list_cases`.
pub trait CaseStore: Send + Sync {
    /// Snapshot of every stored case, in insertion order.
    fn list_cases(&self) -> Result<Vec<Case>, DomainError>;

    fn count(&self) -> Result<usize, DomainError>;

    fn insert(&self, cases: Vec<Case>) -> Result<(), DomainError>;

    /// Embeds and stores `initial` only when the store holds no cases.
    /// Returns the number of cases inserted.
    fn seed_if_empty(
        &self,
        initial: &[CaseSeed],
        embedder: &dyn EmbeddingEngine,
        model: &str,
    ) -> Result<usize, DomainError> {
        let existing = self.count().unwrap_or_else(|err| {
            warn!(target: "fraudapt::store", error = %err, "case count failed, treating store as empty");
            0
        });
        if existing > 0 {
            return Ok(0);
        }

        let cases = embed_seeds(initial, embedder, model)?;
        let inserted = cases.len();
        self.insert(cases)?;
        Ok(inserted)
    }

    /// Verifies the store is readable and its corpus is consistent.
    fn ping(&self) -> Result<(), DomainError>;
}

/// Turns seeds into cases, each with a fresh identifier.
pub fn embed_seeds(
    seeds: &[CaseSeed],
    embedder: &dyn EmbeddingEngine,
    model: &str,
) -> Result<Vec<Case>, DomainError> {
    seeds
        .iter()
        .map(|seed| {
            if seed.text.trim().is_empty() {
                return Err(DomainError::validation("seed case text cannot be empty"));
            }
            let vector = embedder.embed(model, &seed.text)?;
            Ok(Case::new(
                seed.text.clone(),
                seed.label.clone(),
                CaseEmbedding::new(model, vector),
            ))
        })
        .collect()
}

/// The orchestrator responsible for validation, embedding, ranking and scoring.
pub struct FraudService {
    embedder: Arc<dyn EmbeddingEngine>,
    store: Arc<dyn CaseStore>,
    config: ServiceConfig,
}

impl FraudService {
    pub fn new(
        embedder: Arc<dyn EmbeddingEngine>,
        store: Arc<dyn CaseStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Seeds the store with `seeds` if it is still empty.
    pub fn seed(&self, seeds: &[CaseSeed]) -> Result<usize, DomainError> {
        let inserted =
            self.store
                .seed_if_empty(seeds, self.embedder.as_ref(), &self.config.embedding_model)?;
        if inserted > 0 {
            info!(target: "fraudapt::service", inserted, model = %self.config.embedding_model, "seeded fraud case corpus");
        } else {
            debug!(target: "fraudapt::service", "corpus already populated, skipping seed");
        }
        Ok(inserted)
    }

    pub fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResponse, DomainError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(DomainError::validation("message cannot be empty"));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(DomainError::limit(format!(
                "message cannot exceed {} characters",
                MAX_MESSAGE_CHARS
            )));
        }

        // zero is passed through so the ranker reports it
        let top_k = request
            .top_k
            .unwrap_or(self.config.default_top_k)
            .min(self.config.max_top_k);

        let query = self.embedder.embed(&self.config.embedding_model, message)?;
        let cases = self.store.list_cases()?;
        let ranked = rank(&query, &cases, top_k)?;

        debug!(
            target: "fraudapt::service",
            candidates = cases.len(),
            returned = ranked.len(),
            top_k,
            "ranked fraud cases"
        );

        let matches = ranked
            .into_iter()
            .enumerate()
            .map(|(idx, m)| MatchDto {
                rank: idx + 1,
                case_id: m.case.id,
                case: m.case.text.clone(),
                label: m.case.label.clone(),
                score: m.score,
                risk: classify(m.score),
            })
            .collect();

        Ok(AnalysisResponse {
            message: message.to_string(),
            model: self.config.embedding_model.clone(),
            matches,
            analyzed_at: Utc::now(),
        })
    }

    pub fn cases(&self) -> Result<CaseListResponse, DomainError> {
        let items = self
            .store
            .list_cases()?
            .iter()
            .map(Case::as_summary)
            .collect();
        Ok(CaseListResponse { items })
    }

    pub fn embedding_dimensions(&self) -> Option<usize> {
        self.embedder.dims(self.config.embedding_model())
    }

    pub fn health(&self) -> Result<HealthStatusResponse, DomainError> {
        self.store.ping()?;
        let cases = self.store.count()?;

        Ok(HealthStatusResponse {
            ok: true,
            message: "ready".into(),
            details: Some(format!(
                "model: {}, cases: {}, checked_at: {}",
                self.config.embedding_model,
                cases,
                Utc::now()
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{sample_cases, RiskBucket};
    use crate::infrastructure::{MemoryCaseStore, SimpleEmbedEngine};

    const MODEL: &str = "fraudapt/simple-hash";

    fn service() -> FraudService {
        let embedder = Arc::new(SimpleEmbedEngine::try_new(MODEL, 384).unwrap());
        let store = Arc::new(MemoryCaseStore::new());
        FraudService::new(embedder, store, ServiceConfig::with_model(MODEL))
    }

    /// Embeds every text as the same fixed vector.
    struct FixedEngine(Vec<f32>);

    impl EmbeddingEngine for FixedEngine {
        fn embed(&self, _model: &str, _text: &str) -> Result<Vec<f32>, DomainError> {
            Ok(self.0.clone())
        }
    }

    /// Store whose `count` fails while it is empty, relying on the default
    /// `seed_if_empty`.
    #[derive(Default)]
    struct CountFailsWhenEmpty {
        cases: parking_lot::RwLock<Vec<Case>>,
    }

    impl CaseStore for CountFailsWhenEmpty {
        fn list_cases(&self) -> Result<Vec<Case>, DomainError> {
            Ok(self.cases.read().clone())
        }

        fn count(&self) -> Result<usize, DomainError> {
            let len = self.cases.read().len();
            if len == 0 {
                return Err(DomainError::storage("count unavailable"));
            }
            Ok(len)
        }

        fn insert(&self, cases: Vec<Case>) -> Result<(), DomainError> {
            self.cases.write().extend(cases);
            Ok(())
        }

        fn ping(&self) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[test]
    fn test_default_seed_treats_failed_count_as_empty() {
        let store = Arc::new(CountFailsWhenEmpty::default());
        let service = FraudService::new(
            Arc::new(SimpleEmbedEngine::try_new(MODEL, 384).unwrap()),
            Arc::clone(&store) as Arc<dyn CaseStore>,
            ServiceConfig::with_model(MODEL),
        );

        assert_eq!(service.seed(&sample_cases()).unwrap(), 3);
        assert_eq!(store.cases.read().len(), 3);
        assert_eq!(service.seed(&sample_cases()).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_health_fails_when_ping_fails() {
        let store = Arc::new(MemoryCaseStore::with_cases(vec![
            Case::new("a", "Phishing", CaseEmbedding::new(MODEL, vec![1.0, 0.0])),
            Case::new("b", "Phishing", CaseEmbedding::new(MODEL, vec![1.0])),
        ]));
        let service = FraudService::new(
            Arc::new(SimpleEmbedEngine::try_new(MODEL, 384).unwrap()),
            store,
            ServiceConfig::with_model(MODEL),
        );
        assert!(matches!(service.health(), Err(DomainError::Storage(_))));
    }

    #[test]
    fn test_seed_only_once() {
        let service = service();
        assert_eq!(service.seed(&sample_cases()).unwrap(), 3);
        assert_eq!(service.seed(&sample_cases()).unwrap(), 0);
        assert_eq!(service.cases().unwrap().items.len(), 3);
    }

    #[test]
    fn test_analyze_flags_phishing() {
        let service = service();
        service.seed(&sample_cases()).unwrap();

        let response = service
            .analyze(AnalyzeRequest::new(
                "Your account will be suspended, click here to verify",
            ))
            .unwrap();

        assert_eq!(response.matches.len(), 3);
        let top = response.top_match().unwrap();
        assert_eq!(top.rank, 1);
        assert_eq!(top.label, "Phishing");
        assert!(top.score > 0.4);
        assert_ne!(top.risk.bucket, RiskBucket::Low);
    }

    #[test]
    fn test_analyze_empty_store_returns_no_matches() {
        let response = service().analyze(AnalyzeRequest::new("hello")).unwrap();
        assert!(response.matches.is_empty());
        assert!(response.top_match().is_none());
    }

    #[test]
    fn test_analyze_rejects_blank_message() {
        let err = service().analyze(AnalyzeRequest::new("   ")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_analyze_rejects_oversized_message() {
        let long = "a".repeat(MAX_MESSAGE_CHARS + 1);
        let err = service().analyze(AnalyzeRequest::new(long)).unwrap_err();
        assert!(matches!(err, DomainError::LimitExceeded(_)));
    }

    #[test]
    fn test_analyze_respects_top_k() {
        let service = service();
        service.seed(&sample_cases()).unwrap();
        let response = service
            .analyze(AnalyzeRequest::new("click to verify").with_top_k(Some(1)))
            .unwrap();
        assert_eq!(response.matches.len(), 1);
    }

    #[test]
    fn test_analyze_zero_top_k_is_invalid() {
        let service = service();
        service.seed(&sample_cases()).unwrap();
        let err = service
            .analyze(AnalyzeRequest::new("click").with_top_k(Some(0)))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidK(0)));
    }

    #[test]
    fn test_analyze_dimension_mismatch() {
        let store = Arc::new(MemoryCaseStore::new());
        let seeding = FraudService::new(
            Arc::new(FixedEngine(vec![1.0, 0.0, 0.0])),
            Arc::clone(&store) as Arc<dyn CaseStore>,
            ServiceConfig::with_model(MODEL),
        );
        seeding.seed(&sample_cases()).unwrap();

        let querying = FraudService::new(
            Arc::new(FixedEngine(vec![1.0, 0.0])),
            store,
            ServiceConfig::with_model(MODEL),
        );
        let err = querying.analyze(AnalyzeRequest::new("hi")).unwrap_err();
        assert!(matches!(
            err,
            DomainError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_seed_rejects_blank_text() {
        let err = service()
            .seed(&[CaseSeed::new("  ", "Phishing")])
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_health_reports_case_count() {
        let service = service();
        service.seed(&sample_cases()).unwrap();
        let health = service.health().unwrap();
        assert!(health.ok);
        assert!(health.details.unwrap().contains("cases: 3"));
    }

    #[test]
    fn test_config_clamps_default_top_k() {
        let config = ServiceConfig::new("m", 100, 10);
        assert_eq!(config.default_top_k, 10);
        let config = ServiceConfig::new("m", 0, 0);
        assert_eq!(config.max_top_k, 1);
        assert_eq!(config.default_top_k, 1);
    }
}
