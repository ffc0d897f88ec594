//! Generative-AI provider abstraction.
//!
//! The Describer talks to the provider through [`VisionProvider`] so tests can
//! swap in [`mock::MockVisionProvider`] for the Gemini HTTP client.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use gemini::GenerateContentRequest;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider returned a non-JSON body (status {status}): {reason}")]
    InvalidBody { status: u16, reason: String },
}

/// The provider's answer, untouched: HTTP status plus the decoded JSON body.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    pub status: u16,
    pub body: Value,
}

impl ProviderReply {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for image-capable content generation (e.g., Gemini).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send one `generateContent` request. A reply is returned for any HTTP
    /// status as long as the body is JSON.
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<ProviderReply, ProviderError>;

    /// Model identifier, for logs and metrics.
    fn model(&self) -> &str;
}

impl From<ProviderError> for service_core::error::AppError {
    fn from(err: ProviderError) -> Self {
        service_core::error::AppError::InternalError(anyhow::Error::new(err))
    }
}
