//! HTTP API for runmedic.
//!
//! Exposes the two inspection drivers over HTTP:
//!
//! - `POST /api/v1/inspect` runs the concurrent driver and answers inline
//! - `POST /api/v1/orchestrations` starts a checkpointed inspection and
//!   answers 202 with a status URI
//! - `GET /api/v1/orchestrations/{id}` reports an instance's status
//! - `GET /health` needs no credential
//!
//! # Example
//!
//! ```ignore
//! use runmedic_server::{AppState, Server, ServerConfig};
//!
//! let config = ServerConfig::new().with_bind_address("127.0.0.1:7071".parse()?);
//! let state = AppState::new(driver, config).with_orchestrations(host);
//! Server::from_state(state).run().await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;
pub mod validation;

pub use auth::{ForwardedCredential, credential_from_headers};
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use logging::request_logging_middleware;
pub use routes::{HealthResponse, StartedResponse};
pub use state::AppState;

use std::net::SocketAddr;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The runmedic HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(routes::health_routes())
            .nest("/api/v1", self.api_routes())
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                logging::request_logging_middleware,
            ))
            .layer(DefaultBodyLimit::max(self.state.config.max_body_size))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// API routes (v1). Every handler requires a forwarded bearer credential.
    fn api_routes(&self) -> Router<AppState> {
        use axum::routing::{get, post};

        Router::new()
            .route("/inspect", post(routes::inspect_handler))
            .route(
                "/orchestrations",
                post(routes::start_orchestration_handler),
            )
            .route(
                "/orchestrations/{id}",
                get(routes::orchestration_status_handler),
            )
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
