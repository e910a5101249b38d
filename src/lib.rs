use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::info;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod settings;

use application::services::{CaseStore, EmbeddingEngine as EmbeddingEngineTrait, ServiceConfig};
use application::{
    AnalysisResponse, AnalyzeRequest, EmbeddingBackendListResponse, EmbeddingBackendOption,
    FraudService,
};
use domain::DomainError;
#[cfg(feature = "fastembed-engine")]
use infrastructure::FastEmbedEngine;
use infrastructure::{MemoryCaseStore, SimpleEmbedEngine};
use settings::{available_backends, AppConfig, ConfigManager, EmbeddingBackend};

const ENV_DATA_DIR: &str = "FRAUDAPT_DATA_DIR";
const ENV_LOG: &str = "FRAUDAPT_LOG";

/// Human-readable name of the active case store, shown in report footers.
pub const STORE_NAME: &str = "in-memory";

pub struct AppHandles {
    pub service: Arc<FraudService>,
    pub store: Arc<dyn CaseStore>,
    pub config: Arc<ConfigManager>,
    pub data_dir: PathBuf,
}

/// Loads config from the data directory, builds the embedder and store, and
/// seeds the corpus.
pub fn build_environment() -> Result<AppHandles> {
    let data_dir = resolve_data_dir()?;
    build_environment_at(data_dir)
}

pub fn build_environment_at(data_dir: PathBuf) -> Result<AppHandles> {
    let config = Arc::new(ConfigManager::load(&data_dir).context("failed to load config file")?);
    let active_config = config.current();

    let store: Arc<dyn CaseStore> = Arc::new(MemoryCaseStore::new());
    let service = Arc::new(build_service(&active_config, Arc::clone(&store))?);

    let seeds = active_config
        .load_seeds(&data_dir)
        .context("failed to load seed cases")?;
    service
        .seed(&seeds)
        .context("failed to seed fraud case corpus")?;

    info!(
        target: "fraudapt::bootstrap",
        data_dir = %data_dir.display(),
        backend = active_config.embedding.id(),
        model = active_config.embedding.model_name(),
        "environment ready"
    );

    Ok(AppHandles {
        service,
        store,
        config,
        data_dir,
    })
}

fn build_service(config: &AppConfig, store: Arc<dyn CaseStore>) -> Result<FraudService> {
    let embedder = init_embedder(&config.embedding)
        .context("failed to initialise embedding backend")?;
    let service_config = ServiceConfig::new(
        config.embedding.model_name(),
        config.search.top_k,
        config.search.max_top_k,
    );
    Ok(FraudService::new(embedder, store, service_config))
}

fn init_embedder(backend: &EmbeddingBackend) -> Result<Arc<dyn EmbeddingEngineTrait>> {
    match backend {
        EmbeddingBackend::Simple { model, dimensions } => {
            let engine = SimpleEmbedEngine::try_new(model.clone(), *dimensions)
                .map_err(|err| anyhow!(err.to_string()))?;
            Ok(Arc::new(engine))
        }
        #[cfg(feature = "fastembed-engine")]
        EmbeddingBackend::FastEmbed { model } => {
            let engine = FastEmbedEngine::try_new(model).map_err(|err| anyhow!(err.to_string()))?;
            Ok(Arc::new(engine))
        }
    }
}

/// Analyzes each message on the blocking pool; results keep input order.
pub async fn analyze_many(
    service: Arc<FraudService>,
    messages: Vec<String>,
    top_k: Option<usize>,
) -> Vec<Result<AnalysisResponse, DomainError>> {
    let handles: Vec<_> = messages
        .into_iter()
        .map(|message| {
            let service = Arc::clone(&service);
            tokio::task::spawn_blocking(move || {
                service.analyze(AnalyzeRequest::new(message).with_top_k(top_k))
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(
            handle
                .await
                .unwrap_or_else(|err| Err(DomainError::other(err.to_string()))),
        );
    }
    results
}

/// Lists compiled-in backends, marking the active one with the service's
/// actual dimensionality.
pub fn build_backend_response(
    active: &EmbeddingBackend,
    service: &FraudService,
) -> EmbeddingBackendListResponse {
    let mut options: Vec<EmbeddingBackendOption> = available_backends()
        .into_iter()
        .map(|backend| EmbeddingBackendOption {
            id: backend.id().to_string(),
            label: backend.label().to_string(),
            description: backend.description().to_string(),
            model: backend.model_name().to_string(),
            dimensions: backend.expected_dimensions(),
            feature_gated: backend.is_feature_gated(),
        })
        .collect();

    if let Some(option) = options.iter_mut().find(|opt| opt.id == active.id()) {
        option.model = active.model_name().to_string();
        option.dimensions = service
            .embedding_dimensions()
            .or_else(|| active.expected_dimensions());
    }

    EmbeddingBackendListResponse {
        active: active.id().to_string(),
        options,
    }
}

/// Switches the persisted embedding backend. Takes effect on next start.
pub fn set_embedding_backend(
    config: &ConfigManager,
    backend_id: &str,
    model_override: Option<String>,
) -> Result<AppConfig> {
    let backend = EmbeddingBackend::with_default_model(backend_id)
        .ok_or_else(|| anyhow!("unknown backend '{backend_id}'"))?
        .with_model_override(model_override);

    // fail before persisting a backend that cannot start
    init_embedder(&backend)?;

    config
        .set_backend(backend)
        .context("failed to persist embedding backend")
}

/// Installs the stderr fmt subscriber once. `level` wins over `FRAUDAPT_LOG`.
pub fn init_tracing(level: Option<&str>) {
    static INIT: std::sync::OnceLock<()> = std::sync::OnceLock::new();

    let _ = INIT.get_or_init(|| {
        let filter = level
            .map(str::to_string)
            .or_else(|| std::env::var(ENV_LOG).ok())
            .unwrap_or_else(|| "info".into());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .try_init();
    });
}

fn resolve_data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(ENV_DATA_DIR) {
        Some(dir) => PathBuf::from(dir),
        None => directories::ProjectDirs::from("dev", "fraudapt", "FraudAPT")
            .ok_or_else(|| anyhow!("unable to determine OS data dir"))?
            .data_dir()
            .to_path_buf(),
    };
    std::fs::create_dir_all(&dir).context("failed to create data directory")?;
    Ok(dir)
}
