//! Storage adapters for FraudAPT.
//!
//! This module currently exposes the in-memory case store that backs
//! similarity ranking and corpus listings.

pub mod memory_store;

pub use memory_store::MemoryCaseStore;
