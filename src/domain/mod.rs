//! Domain layer: fraud cases, similarity ranking and risk scoring.

pub mod errors;
pub mod models;
pub mod ranking;
pub mod risk;

pub use errors::DomainError;
pub use models::{sample_cases, Case, CaseEmbedding, CaseSeed, CaseSummary, Match};
pub use ranking::{cosine_similarity, rank};
pub use risk::{classify, RiskBucket, RiskLabel};
