//! Application layer wiring DTOs and services for FraudAPT.

pub mod dtos;
pub mod services;

pub use dtos::{
    AnalysisResponse, AnalyzeRequest, CaseListResponse, EmbeddingBackendListResponse,
    EmbeddingBackendOption, HealthStatusResponse, MatchDto,
};
pub use services::FraudService;
