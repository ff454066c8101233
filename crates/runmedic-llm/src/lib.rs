//! Generative-language client for runmedic.
//!
//! The core abstraction is the [`GenerativeBackend`] trait. The production
//! implementation talks to the Gemini `generateContent` endpoint; a
//! [`MockBackend`] is available behind the `testing` feature.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  GenerativeBackend trait             │
//! │  - generate(request) -> Response     │
//! └──────────────────────────────────────┘
//!          │                  │
//!          ▼                  ▼
//!    ┌──────────┐      ┌─────────────┐
//!    │  Gemini  │      │ MockBackend │
//!    └──────────┘      └─────────────┘
//! ```

pub mod backend;
pub mod error;
pub mod gemini;
pub mod types;

pub use backend::{GenerativeBackend, SharedBackend};
#[cfg(any(test, feature = "testing"))]
pub use backend::{MockBackend, MockResponse};
pub use error::{LlmError, Result};
pub use gemini::{GeminiBackend, GeminiConfig};
pub use types::{Candidate, Content, GenerateRequest, GenerateResponse, Part};
