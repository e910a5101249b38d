use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{sample_cases, CaseSeed};
use crate::infrastructure::embeddings::{DEFAULT_SIMPLE_DIMENSIONS, DEFAULT_SIMPLE_MODEL};

/// Default filename used to persist configuration within the data directory.
const CONFIG_FILENAME: &str = "config.json";

/// Declarative list of embedding backends compiled into the binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "kebab-case")]
pub enum EmbeddingBackend {
    /// Lightweight deterministic hash embedder (always available).
    Simple {
        #[serde(default = "default_simple_model")]
        model: String,
        #[serde(default = "default_simple_dim")]
        dimensions: usize,
    },
    /// Semantic MiniLM embeddings powered by FastEmbed (feature gated).
    #[cfg(feature = "fastembed-engine")]
    FastEmbed { model: String },
}

impl EmbeddingBackend {
    pub fn id(&self) -> &'static str {
        match self {
            EmbeddingBackend::Simple { .. } => "simple",
            #[cfg(feature = "fastembed-engine")]
            EmbeddingBackend::FastEmbed { .. } => "fastembed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmbeddingBackend::Simple { .. } => "Deterministic Hash (offline)",
            #[cfg(feature = "fastembed-engine")]
            EmbeddingBackend::FastEmbed { .. } => "FastEmbed (semantic)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EmbeddingBackend::Simple { .. } => {
                "Word-hashing vectors; matches on shared vocabulary, no model download."
            }
            #[cfg(feature = "fastembed-engine")]
            EmbeddingBackend::FastEmbed { .. } => {
                "MiniLM sentence embeddings via fastembed/ONNX runtime, loaded on first use."
            }
        }
    }

    pub fn is_feature_gated(&self) -> bool {
        #[cfg(feature = "fastembed-engine")]
        {
            return matches!(self, EmbeddingBackend::FastEmbed { .. });
        }

        #[cfg(not(feature = "fastembed-engine"))]
        {
            false
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            EmbeddingBackend::Simple { model, .. } => model,
            #[cfg(feature = "fastembed-engine")]
            EmbeddingBackend::FastEmbed { model } => model,
        }
    }

    pub fn expected_dimensions(&self) -> Option<usize> {
        match self {
            EmbeddingBackend::Simple { dimensions, .. } => Some(*dimensions),
            #[cfg(feature = "fastembed-engine")]
            EmbeddingBackend::FastEmbed { .. } => Some(384),
        }
    }

    pub fn with_default_model(id: &str) -> Option<Self> {
        match id {
            "simple" => Some(EmbeddingBackend::Simple {
                model: default_simple_model(),
                dimensions: default_simple_dim(),
            }),
            #[cfg(feature = "fastembed-engine")]
            "fastembed" => Some(EmbeddingBackend::FastEmbed {
                model: default_fastembed_model(),
            }),
            _ => None,
        }
    }

    /// Replaces the model name when `model_override` is non-blank.
    pub fn with_model_override(mut self, model_override: Option<String>) -> Self {
        if let Some(model) = model_override.and_then(|m| {
            let trimmed = m.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }) {
            match &mut self {
                EmbeddingBackend::Simple {
                    model: backend_model,
                    ..
                } => *backend_model = model,
                #[cfg(feature = "fastembed-engine")]
                EmbeddingBackend::FastEmbed {
                    model: backend_model,
                } => *backend_model = model,
            }
        }
        self
    }
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        #[cfg(feature = "fastembed-engine")]
        {
            EmbeddingBackend::FastEmbed {
                model: default_fastembed_model(),
            }
        }
        #[cfg(not(feature = "fastembed-engine"))]
        {
            EmbeddingBackend::Simple {
                model: default_simple_model(),
                dimensions: default_simple_dim(),
            }
        }
    }
}

/// Result limits applied to each analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_top_k: default_max_top_k(),
        }
    }
}

/// Complete persisted configuration payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub embedding: EmbeddingBackend,
    #[serde(default)]
    pub search: SearchSettings,
    /// JSON file of `{"case", "label"}` entries used instead of the built-in
    /// sample corpus. Relative paths are resolved against the data directory.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

impl AppConfig {
    /// Seeds for an empty corpus: the configured file, or the built-in samples.
    pub fn load_seeds(&self, data_dir: &Path) -> std::io::Result<Vec<CaseSeed>> {
        match &self.seed_file {
            Some(path) => {
                // join keeps absolute paths as they are
                let bytes = fs::read(data_dir.join(path))?;
                serde_json::from_slice(&bytes).map_err(std::io::Error::from)
            }
            None => Ok(sample_cases()),
        }
    }
}

/// Thread-safe manager responsible for loading and persisting `AppConfig`.
pub struct ConfigManager {
    path: PathBuf,
    state: RwLock<AppConfig>,
}

impl ConfigManager {
    /// Create a manager rooted at `data_dir`. The JSON file will be located at
    /// `<data_dir>/config.json`. A missing or unreadable file yields defaults.
    pub fn load(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = data_dir.as_ref().join(CONFIG_FILENAME);
        let config = if path.exists() {
            let bytes = fs::read(&path)?;
            serde_json::from_slice::<AppConfig>(&bytes).unwrap_or_else(|err| {
                warn!(target: "fraudapt::settings", path = %path.display(), error = %err, "ignoring malformed config");
                AppConfig::default()
            })
        } else {
            AppConfig::default()
        };

        Ok(Self {
            path,
            state: RwLock::new(config),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current configuration.
    pub fn current(&self) -> AppConfig {
        self.state.read().clone()
    }

    /// Update the active embedding backend and persist to disk.
    pub fn set_backend(&self, backend: EmbeddingBackend) -> std::io::Result<AppConfig> {
        let mut guard = self.state.write();
        guard.embedding = backend;
        self.persist_locked(&guard)?;
        Ok(guard.clone())
    }

    /// Ensure the backing directory exists and write the JSON payload.
    fn persist_locked(&self, config: &AppConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(config)?;
        fs::write(&self.path, payload)
    }
}

pub fn available_backends() -> Vec<EmbeddingBackend> {
    #[cfg(feature = "fastembed-engine")]
    {
        vec![
            EmbeddingBackend::FastEmbed {
                model: default_fastembed_model(),
            },
            EmbeddingBackend::Simple {
                model: default_simple_model(),
                dimensions: default_simple_dim(),
            },
        ]
    }
    #[cfg(not(feature = "fastembed-engine"))]
    {
        vec![EmbeddingBackend::default()]
    }
}

const fn default_simple_dim() -> usize {
    DEFAULT_SIMPLE_DIMENSIONS
}

fn default_simple_model() -> String {
    DEFAULT_SIMPLE_MODEL.to_string()
}

#[cfg(feature = "fastembed-engine")]
fn default_fastembed_model() -> String {
    crate::infrastructure::embeddings::DEFAULT_FASTEMBED_MODEL.to_string()
}

const fn default_top_k() -> usize {
    3
}

const fn default_max_top_k() -> usize {
    32
}
