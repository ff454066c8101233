//! Backend trait and the mock used in tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GenerateRequest, GenerateResponse};

/// Trait for generative-language providers.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Send a prompt and return the parsed response.
    ///
    /// Implementations return [`crate::LlmError::Status`] for any HTTP status
    /// other than 200.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Name of this backend, for logging.
    fn name(&self) -> &str;
}

/// A shared, thread-safe backend.
pub type SharedBackend = Arc<dyn GenerativeBackend>;

// ─────────────────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────────────────

/// Canned reply for [`MockBackend`].
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 200 with one candidate holding this text.
    Text(String),
    /// 200 with an empty candidates list.
    NoCandidates,
    /// A non-200 status.
    Status(u16, String),
}

/// Mock backend for testing.
///
/// Replies are returned in order. Once exhausted, the last reply repeats.
#[cfg(any(test, feature = "testing"))]
pub struct MockBackend {
    responses: std::sync::Mutex<Vec<MockResponse>>,
    request_log: std::sync::Mutex<Vec<GenerateRequest>>,
}

#[cfg(any(test, feature = "testing"))]
impl MockBackend {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            request_log: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a mock backend with a single text response.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![MockResponse::Text(text.into())])
    }

    /// Get all requests that were made to this backend.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.request_log.lock().unwrap().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.request_log.lock().unwrap().len()
    }
}

#[cfg(any(test, feature = "testing"))]
#[async_trait]
impl GenerativeBackend for MockBackend {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        self.request_log.lock().unwrap().push(request);

        let mut responses = self.responses.lock().unwrap();
        let next = if responses.len() > 1 {
            responses.remove(0)
        } else {
            responses
                .first()
                .cloned()
                .unwrap_or(MockResponse::NoCandidates)
        };

        match next {
            MockResponse::Text(text) => Ok(GenerateResponse::with_text(text)),
            MockResponse::NoCandidates => Ok(GenerateResponse::default()),
            MockResponse::Status(status, body) => {
                Err(crate::error::LlmError::Status { status, body })
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
