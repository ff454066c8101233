//! Builds the pipeline components from configuration.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use runmedic_config::{RunmedicConfig, SecretSource, StoreLocation, resolve_generative_api_key};
use runmedic_llm::{GeminiBackend, GeminiConfig};
use runmedic_pipeline::{
    ConcurrentDriver, InMemoryCheckpointStore, OrchestrationHost, RemediationRequester,
    RetryPolicy, SharedCheckpointStore, SqliteCheckpointStore,
};
use runmedic_resource::{ArmClient, ArmConfig, SharedResourceApi};

/// The wired-up pipeline.
pub struct Services {
    pub resources: SharedResourceApi,
    pub remediation: Arc<RemediationRequester>,
    config: RunmedicConfig,
}

impl Services {
    pub fn from_config(config: &RunmedicConfig) -> Result<Self> {
        Ok(Self {
            resources: resource_api(config)?,
            remediation: remediation(config)?,
            config: config.clone(),
        })
    }

    pub fn driver(&self) -> ConcurrentDriver {
        ConcurrentDriver::new(self.resources.clone(), self.remediation.clone())
            .with_max_concurrent_lookups(self.config.resource().max_concurrent_lookups)
    }

    /// Orchestration host over the configured checkpoint store.
    pub fn orchestration_host(&self) -> Result<OrchestrationHost> {
        let orchestration = self.config.orchestration();
        let retry = RetryPolicy::new(
            orchestration.max_attempts,
            orchestration.first_retry_interval(),
            orchestration.backoff_coefficient,
        )
        .with_max_retry_interval(orchestration.max_retry_interval());
        let store = checkpoint_store(orchestration.store_location())?;

        Ok(
            OrchestrationHost::new(store, self.resources.clone(), self.remediation.clone())
                .with_retry_policy(retry),
        )
    }
}

fn resource_api(config: &RunmedicConfig) -> Result<SharedResourceApi> {
    let resource = config.resource();
    let timeout = resource.timeout();
    let arm = ArmConfig::new()
        .with_base_url(resource.base_url)
        .with_api_version(resource.api_version)
        .with_timeout(timeout)
        .with_max_pages(resource.max_pages);
    let client = ArmClient::new(arm).context("Failed to build resource API client")?;
    Ok(Arc::new(client))
}

fn remediation(config: &RunmedicConfig) -> Result<Arc<RemediationRequester>> {
    let remediation = config.remediation();
    let secret = resolve_generative_api_key(remediation.api_key.as_deref()).context(
        "No generative API key found; set RUNMEDIC_GEMINI_API_KEY or [remediation] api_key",
    )?;
    if secret.source == SecretSource::ConfigFile {
        tracing::warn!("Generative API key is stored in plaintext config; prefer RUNMEDIC_GEMINI_API_KEY");
    } else {
        tracing::debug!(source = %secret.source, "Resolved generative API key");
    }

    let timeout = remediation.timeout();
    let raw_code_only = remediation.raw_code_only;
    let gemini = GeminiConfig::new(secret.value)
        .with_base_url(remediation.base_url)
        .with_model(remediation.model)
        .with_timeout(timeout);
    let backend = GeminiBackend::new(gemini).context("Failed to build generative backend")?;

    Ok(Arc::new(
        RemediationRequester::new(Arc::new(backend)).with_raw_code_only(raw_code_only),
    ))
}

fn checkpoint_store(location: StoreLocation) -> Result<SharedCheckpointStore> {
    match location {
        StoreLocation::Memory => {
            tracing::info!("Using in-memory checkpoint store");
            Ok(Arc::new(InMemoryCheckpointStore::new()))
        }
        StoreLocation::Path(path) => {
            tracing::info!(path = %path.display(), "Opening checkpoint store");
            let store = SqliteCheckpointStore::open(&path)
                .with_context(|| format!("Failed to open checkpoint store {}", path.display()))?;
            Ok(Arc::new(store))
        }
    }
}
