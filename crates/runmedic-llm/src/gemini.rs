//! Gemini `generateContent` backend.
//!
//! Requests go to `{base_url}/models/{model}:generateContent?key={api_key}`.
//! There is no retry: a non-200 answer is logged and surfaced as
//! [`LlmError::Status`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};

use crate::backend::GenerativeBackend;
use crate::error::{LlmError, Result};
use crate::types::{GenerateRequest, GenerateResponse};

/// Default API base URL.
const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the Gemini backend.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key, sent as the `key` query parameter.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Request timeout. `None` keeps the HTTP client default.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_GEMINI_BASE.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: None,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend
// ─────────────────────────────────────────────────────────────────────────────

/// Gemini API backend.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::Config("Gemini API key is empty".to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build the generateContent endpoint URL (without the key).
    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        tracing::debug!(
            model = %self.config.model,
            prompt_chars = request.text().len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.config.api_key.as_str())])
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::info!(status = status.as_u16(), "Generative API response");
        tracing::debug!(body = %body, "Generative API response body");

        if status != StatusCode::OK {
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                "Generative API request failed"
            );
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
