use parking_lot::RwLock;

use crate::{
    application::services::{embed_seeds, CaseStore, EmbeddingEngine},
    domain::{Case, CaseSeed, DomainError},
};

/// In-memory case store.
///
/// Cases live in a single `Vec` in insertion order and every query scans the
/// whole snapshot, which is fine for a corpus of a few thousand known cases.
/// A real vector index can satisfy the same trait without touching callers.
#[derive(Default)]
pub struct MemoryCaseStore {
    cases: RwLock<Vec<Case>>,
}

impl MemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cases(cases: Vec<Case>) -> Self {
        Self {
            cases: RwLock::new(cases),
        }
    }
}

impl CaseStore for MemoryCaseStore {
    fn list_cases(&self) -> Result<Vec<Case>, DomainError> {
        Ok(self.cases.read().clone())
    }

    fn count(&self) -> Result<usize, DomainError> {
        Ok(self.cases.read().len())
    }

    fn insert(&self, cases: Vec<Case>) -> Result<(), DomainError> {
        self.cases.write().extend(cases);
        Ok(())
    }

    /// Holds the write lock across the emptiness check and the insert so two
    /// concurrent seeders cannot both populate the store.
    fn seed_if_empty(
        &self,
        initial: &[CaseSeed],
        embedder: &dyn EmbeddingEngine,
        model: &str,
    ) -> Result<usize, DomainError> {
        let mut guard = self.cases.write();
        if !guard.is_empty() {
            return Ok(0);
        }

        let seeded = embed_seeds(initial, embedder, model)?;
        let inserted = seeded.len();
        guard.extend(seeded);
        Ok(inserted)
    }

    /// Every stored case must share the first case's dimensionality.
    fn ping(&self) -> Result<(), DomainError> {
        let cases = self.cases.read();
        let Some(first) = cases.first() else {
            return Ok(());
        };
        let expected = first.embedding.dims();
        if let Some(bad) = cases.iter().find(|c| c.embedding.dims() != expected) {
            return Err(DomainError::storage(format!(
                "case {} has {} dims, corpus uses {}",
                bad.id,
                bad.embedding.dims(),
                expected
            )));
        }
        Ok(())
    }
}
