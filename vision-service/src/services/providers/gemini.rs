//! Gemini provider implementation.
//!
//! Calls `models/{model}:generateContent` on Google's Generative Language API
//! and hands the decoded JSON back unchanged.

use super::{ProviderError, ProviderReply, VisionProvider};
use crate::config::GeminiSettings;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gemini vision provider.
pub struct GeminiVisionProvider {
    settings: GeminiSettings,
    client: Client,
}

impl GeminiVisionProvider {
    pub fn new(settings: GeminiSettings) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { settings, client })
    }

    /// `generateContent` URL without the key; the key goes in the query string.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.model
        )
    }
}

#[async_trait]
impl VisionProvider for GeminiVisionProvider {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<ProviderReply, ProviderError> {
        tracing::debug!(
            model = %self.settings.model,
            parts = request.part_count(),
            "Sending request to Gemini API"
        );

        // Errors are stripped of their URL: it carries the API key.
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.settings.api_key.expose_secret().as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        let body: Value =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::InvalidBody {
                status,
                reason: e.to_string(),
            })?;

        Ok(ProviderReply { status, body })
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

// ============================================================================
// Gemini API Request Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// A request with one user turn made of `parts`.
    pub fn single_turn(parts: Vec<ContentPart>) -> Self {
        Self {
            contents: vec![Content { role: None, parts }],
        }
    }

    pub fn part_count(&self) -> usize {
        self.contents.iter().map(|c| c.parts.len()).sum()
    }

    /// First inline-data part, if any.
    pub fn inline_data(&self) -> Option<&InlineData> {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .find_map(|p| match p {
                ContentPart::InlineData { inline_data } => Some(inline_data),
                ContentPart::Text { .. } => None,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}
