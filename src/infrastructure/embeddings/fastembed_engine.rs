use std::str::FromStr;

use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use parking_lot::Mutex;
use tracing::info;

use crate::{application::services::EmbeddingEngine, domain::DomainError};

pub const DEFAULT_FASTEMBED_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Embedding engine backed by `fastembed`'s `TextEmbedding`.
///
/// The ONNX model is loaded on the first `embed` call and then kept behind a
/// `Mutex` for the lifetime of the engine, so one process shares a single
/// loaded model across all queries.
pub struct FastEmbedEngine {
    model_label: String,
    model: EmbeddingModel,
    dimensions: usize,
    inner: Mutex<Option<TextEmbedding>>,
}

impl FastEmbedEngine {
    /// Resolve the model (for example `sentence-transformers/all-MiniLM-L6-v2`)
    /// without loading it.
    pub fn try_new(model_name: impl AsRef<str>) -> Result<Self, DomainError> {
        let label = model_name.as_ref().trim();
        if label.is_empty() {
            return Err(DomainError::validation(
                "fastembed model name cannot be empty",
            ));
        }

        let model = resolve_model(label)?;
        let model_info = TextEmbedding::get_model_info(&model).map_err(|err| {
            DomainError::embedding(format!(
                "unable to read metadata for fastembed model `{label}`: {err}"
            ))
        })?;

        Ok(Self {
            model_label: label.to_string(),
            dimensions: model_info.dim,
            model,
            inner: Mutex::new(None),
        })
    }
}

fn resolve_model(label: &str) -> Result<EmbeddingModel, DomainError> {
    if label.to_ascii_lowercase().ends_with("all-minilm-l6-v2") {
        return Ok(EmbeddingModel::AllMiniLML6V2);
    }
    EmbeddingModel::from_str(label).map_err(|err| {
        DomainError::embedding(format!("failed to parse fastembed model `{label}`: {err}"))
    })
}

impl EmbeddingEngine for FastEmbedEngine {
    fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>, DomainError> {
        if !model.eq_ignore_ascii_case(&self.model_label) {
            return Err(DomainError::embedding(format!(
                "engine initialised for `{}` but `{}` requested",
                self.model_label, model
            )));
        }

        if text.trim().is_empty() {
            return Err(DomainError::validation("text payload cannot be empty"));
        }

        let mut guard = self.inner.lock();
        if guard.is_none() {
            info!(target: "fraudapt::embeddings", model = %self.model_label, "loading fastembed model");
            let loaded = TextEmbedding::try_new(TextInitOptions::new(self.model.clone()))
                .map_err(|err| {
                    DomainError::embedding(format!(
                        "failed to initialise fastembed model `{}`: {err}",
                        self.model_label
                    ))
                })?;
            *guard = Some(loaded);
        }
        let embedder = guard
            .as_mut()
            .ok_or_else(|| DomainError::embedding("fastembed model not loaded"))?;

        let embeddings = embedder
            .embed(vec![text], None)
            .map_err(|err| DomainError::other(format!("fastembed inference failed: {err}")))?;
        let vector = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::other("fastembed returned no embedding"))?;

        if vector.len() != self.dimensions {
            return Err(DomainError::dimension_mismatch(self.dimensions, vector.len()));
        }

        Ok(vector)
    }

    fn dims(&self, _model: &str) -> Option<usize> {
        Some(self.dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_minilm_alias() {
        assert_eq!(
            resolve_model(DEFAULT_FASTEMBED_MODEL).unwrap(),
            EmbeddingModel::AllMiniLML6V2
        );
        assert_eq!(
            resolve_model("Qdrant/all-MiniLM-L6-v2").unwrap(),
            EmbeddingModel::AllMiniLML6V2
        );
    }

    #[test]
    fn test_minilm_has_384_dims_without_loading() {
        let engine = FastEmbedEngine::try_new(DEFAULT_FASTEMBED_MODEL).unwrap();
        assert_eq!(engine.dims(DEFAULT_FASTEMBED_MODEL), Some(384));
        assert!(engine.inner.lock().is_none());
    }
}
