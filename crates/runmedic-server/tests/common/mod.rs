//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use runmedic_llm::MockBackend;
use runmedic_pipeline::{
    ConcurrentDriver, OrchestrationHost, RemediationRequester, SqliteCheckpointStore,
};
use runmedic_resource::MockResourceApi;
use runmedic_server::{AppState, Server, ServerConfig};

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// The bearer token sent by the helpers.
    pub token: String,
    /// HTTP client configured for this server.
    pub client: Client,
    /// Resource API seen by both drivers.
    pub api: Arc<MockResourceApi>,
    /// Generative backend seen by both drivers.
    pub backend: Arc<MockBackend>,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
    /// Holds the checkpoint database.
    pub temp_dir: TempDir,
}

impl TestServer {
    /// Start a test server with an empty resource API.
    pub async fn start() -> Result<Self> {
        Self::start_with(MockResourceApi::new(), MockBackend::with_text("Test response")).await
    }

    /// Start a test server over the given mocks, with a SQLite checkpoint store.
    pub async fn start_with(api: MockResourceApi, backend: MockBackend) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let token = "test-token".to_string();

        let addr = find_available_port().await?;

        let api = Arc::new(api);
        let backend = Arc::new(backend);
        let remediation = Arc::new(RemediationRequester::new(backend.clone()));
        let driver = ConcurrentDriver::new(api.clone(), remediation.clone());

        let store = Arc::new(SqliteCheckpointStore::open(
            &temp_dir.path().join("orchestrations.db"),
        )?);
        let host = OrchestrationHost::new(store, api.clone(), remediation);

        let config = ServerConfig::new()
            .with_bind_address(addr)
            .with_request_logging(false);
        let state = AppState::new(driver, config).with_orchestrations(host);

        let server = Server::from_state(state);
        let handle = tokio::spawn(async move {
            let _ = server.run_on(addr).await;
        });

        let client = Client::new();
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            token,
            client,
            api,
            backend,
            _handle: handle,
            temp_dir,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// GET with the bearer token.
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url(), path))
            .bearer_auth(&self.token)
    }

    /// POST with the bearer token.
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url(), path))
            .bearer_auth(&self.token)
    }

    /// Check if server is healthy.
    pub async fn health(&self) -> Result<bool> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url()))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Poll an orchestration's status URI until it leaves Pending/Running.
    pub async fn wait_for_orchestration(&self, status_uri: &str) -> Result<serde_json::Value> {
        let poll = async {
            loop {
                let body: serde_json::Value = self.get(status_uri).send().await?.json().await?;
                match body["runtimeStatus"].as_str() {
                    Some("Pending") | Some("Running") => {
                        tokio::time::sleep(Duration::from_millis(20)).await
                    }
                    _ => return Ok::<_, anyhow::Error>(body),
                }
            }
        };

        match timeout(Duration::from_secs(10), poll).await {
            Ok(result) => result,
            Err(_) => anyhow::bail!("Timeout waiting for orchestration"),
        }
    }
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
