//! Mock provider implementation for testing.

use super::{GenerateContentRequest, ProviderError, ProviderReply, VisionProvider};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Behavior {
    Reply(ProviderReply),
    /// Answers with the request's own base64 image data as the text.
    EchoImage,
    Fail(String),
}

/// Mock vision provider for testing. Records every request it receives.
pub struct MockVisionProvider {
    behavior: Behavior,
    requests: Mutex<Vec<GenerateContentRequest>>,
}

impl MockVisionProvider {
    pub fn replying(reply: ProviderReply) -> Self {
        Self::with_behavior(Behavior::Reply(reply))
    }

    /// Replies with a well-formed envelope whose text is `text`.
    pub fn answering(text: &str) -> Self {
        Self::replying(ProviderReply::ok(candidate_envelope(text)))
    }

    pub fn echoing_image() -> Self {
        Self::with_behavior(Behavior::EchoImage)
    }

    pub fn failing(message: &str) -> Self {
        Self::with_behavior(Behavior::Fail(message.to_string()))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

/// `{"candidates":[{"content":{"parts":[{"text": text}]}}]}`
pub fn candidate_envelope(text: &str) -> serde_json::Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<ProviderReply, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        // Yield so concurrent callers interleave.
        tokio::task::yield_now().await;

        match &self.behavior {
            Behavior::Reply(reply) => Ok(reply.clone()),
            Behavior::EchoImage => {
                let data = request
                    .inline_data()
                    .map(|d| d.data.as_str())
                    .unwrap_or_default();
                Ok(ProviderReply::ok(candidate_envelope(data)))
            }
            Behavior::Fail(message) => Err(ProviderError::NetworkError(message.clone())),
        }
    }

    fn model(&self) -> &str {
        "mock-vision"
    }
}
