//! Infrastructure layer wiring concrete adapters (embeddings, storage).

pub mod embeddings;
pub mod storage;

#[cfg(feature = "fastembed-engine")]
pub use embeddings::FastEmbedEngine;
pub use embeddings::SimpleEmbedEngine;
pub use storage::MemoryCaseStore;
