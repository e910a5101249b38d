//! Service layer orchestrating domain operations and infrastructure adapters.

mod fraud_service;

pub use fraud_service::{embed_seeds, CaseStore, EmbeddingEngine, FraudService, ServiceConfig};
