//! Application state shared across handlers.

use std::sync::Arc;

use runmedic_pipeline::{ConcurrentDriver, OrchestrationHost};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Driver behind `POST /api/v1/inspect`.
    pub driver: Arc<ConcurrentDriver>,

    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Orchestration host (optional, `None` when orchestration is disabled).
    pub orchestrations: Option<Arc<OrchestrationHost>>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(driver: ConcurrentDriver, config: ServerConfig) -> Self {
        Self {
            driver: Arc::new(driver),
            config: Arc::new(config),
            orchestrations: None,
        }
    }

    /// Enable the orchestration routes.
    pub fn with_orchestrations(mut self, host: OrchestrationHost) -> Self {
        self.orchestrations = Some(Arc::new(host));
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
