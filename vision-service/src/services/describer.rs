//! Image description: upload → Gemini payload → provider → HTML.

use crate::models::{Description, UnwrapFailure, Upload};
use crate::services::providers::gemini::{ContentPart, GenerateContentRequest, InlineData};
use crate::services::providers::{ProviderError, VisionProvider};
use base64::Engine;
use metrics::{counter, histogram};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Instruction sent ahead of every image.
pub const WASTE_CLASSIFICATION_PROMPT: &str = concat!(
    "You are an expert in sustainable waste management. ",
    "Analyze the uploaded image and classify the type of waste (e.g., food peel, paper, plastic, etc.). ",
    "If it's organic waste (like fruit peels, vegetable scraps, eggshells, etc.), do the following:\n",
    "1. Clearly state that it's organic waste.\n",
    "2. Identify exactly what it is (e.g., banana peel, orange peel, etc.).\n",
    "3. Provide a short paragraph describing its environmental impact if reused.\n",
    "4. Provide an HTML list of 3–5 clear steps users can follow at home to reuse or compost it — include where (e.g., garden, kitchen, community bin), and how (e.g., bury it, blend into compost, dry and crush, etc.).\n",
    "5. Explain how these steps help the planet (in terms of reducing landfill, improving soil, or reducing methane).\n\n",
    "Format your answer as HTML with:\n",
    "- A <h2> title stating if it’s organic or not\n",
    "- A <p> summary\n",
    "- An <ul> with steps\n",
    "- An optional <p> footer about benefits to the environment",
);

/// Turns an [`Upload`] into a [`Description`] with a single provider call.
#[derive(Clone)]
pub struct Describer {
    provider: Arc<dyn VisionProvider>,
}

impl Describer {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self { provider }
    }

    /// Standard base64 (padded) of the whole upload.
    pub fn encode(content: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(content)
    }

    /// Prompt first, then the image tagged with its declared media type.
    pub fn build_request(upload: &Upload) -> GenerateContentRequest {
        GenerateContentRequest::single_turn(vec![
            ContentPart::Text {
                text: WASTE_CLASSIFICATION_PROMPT.to_string(),
            },
            ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: upload.media_type.clone(),
                    data: Self::encode(&upload.content),
                },
            },
        ])
    }

    /// Network failures and non-JSON bodies are errors; a JSON body of any
    /// shape becomes a [`Description`].
    pub async fn describe(&self, upload: &Upload) -> Result<Description, ProviderError> {
        if upload.is_empty() {
            tracing::debug!(media_type = %upload.media_type, "Forwarding an empty upload");
        }
        let request = Self::build_request(upload);

        let start = Instant::now();
        let result = self.provider.generate_content(&request).await;
        histogram!(
            "gemini_request_duration_seconds",
            "model" => self.provider.model().to_string()
        )
        .record(start.elapsed().as_secs_f64());

        let reply = result.inspect_err(|e| {
            counter!("describe_results_total", "outcome" => "provider_error").increment(1);
            tracing::error!(error = %e, model = %self.provider.model(), "Gemini request failed");
        })?;

        if !reply.is_success() {
            tracing::warn!(
                status = reply.status,
                model = %self.provider.model(),
                "Gemini returned a non-success status"
            );
        }

        let description = unwrap_payload(reply.body);
        counter!("describe_results_total", "outcome" => description.outcome()).increment(1);

        match description.failure() {
            Some(failure) => tracing::warn!(
                failure = %failure,
                media_type = %upload.media_type,
                "Gemini response had no answer text"
            ),
            None => tracing::info!(
                media_type = %upload.media_type,
                size = upload.len(),
                "Image described"
            ),
        }

        Ok(description)
    }
}

/// Extract `candidates[0].content.parts[0].text`, or keep the whole payload
/// along with the first step that was missing.
pub fn unwrap_payload(raw: Value) -> Description {
    match answer_text(&raw) {
        Ok(text) => Description::Html(text.to_string()),
        Err(failure) => Description::Unparsed { failure, raw },
    }
}

fn answer_text(raw: &Value) -> Result<&str, UnwrapFailure> {
    let candidate = raw
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .ok_or(UnwrapFailure::MissingCandidates)?;

    let content = candidate
        .get("content")
        .ok_or(UnwrapFailure::MissingContent)?;

    let part = content
        .get("parts")
        .and_then(Value::as_array)
        .and_then(|p| p.first())
        .ok_or(UnwrapFailure::MissingParts)?;

    part.get("text")
        .and_then(Value::as_str)
        .ok_or(UnwrapFailure::MissingText)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::MockVisionProvider;
    use crate::services::providers::ProviderReply;
    use serde_json::json;

    fn png_upload() -> Upload {
        Upload::new("image/png", vec![0x89, b'P', b'N', b'G', 0x00, 0xff])
    }

    #[test]
    fn encode_reverses_exactly() {
        let bytes: Vec<u8> = (0..=255).collect();
        let encoded = Describer::encode(&bytes);
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn encode_of_empty_upload_is_empty() {
        assert_eq!(Describer::encode(&[]), "");
    }

    #[test]
    fn request_carries_prompt_then_image() {
        let request = Describer::build_request(&png_upload());

        assert_eq!(request.contents.len(), 1);
        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[0],
            ContentPart::Text {
                text: WASTE_CLASSIFICATION_PROMPT.to_string()
            }
        );
        let inline = request.inline_data().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, Describer::encode(&png_upload().content));
    }

    #[test]
    fn prompt_does_not_depend_on_media_type() {
        let a = Describer::build_request(&Upload::new("image/jpeg", vec![1, 2, 3]));
        let b = Describer::build_request(&Upload::new("text/plain", b"not an image".to_vec()));
        assert_eq!(a.contents[0].parts[0], b.contents[0].parts[0]);
    }

    #[test]
    fn prompt_asks_for_html_sections() {
        for fragment in ["<h2>", "<p>", "<ul>", "organic"] {
            assert!(WASTE_CLASSIFICATION_PROMPT.contains(fragment), "{fragment}");
        }
    }

    #[test]
    fn unwrap_extracts_first_candidate_text() {
        let raw = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "X" }, { "text": "Y" }] } },
                { "content": { "parts": [{ "text": "Z" }] } }
            ]
        });
        assert_eq!(unwrap_payload(raw), Description::Html("X".into()));
    }

    #[test]
    fn unwrap_reports_first_missing_step() {
        let cases = [
            (json!({ "error": "quota exceeded" }), UnwrapFailure::MissingCandidates),
            (json!({ "candidates": [] }), UnwrapFailure::MissingCandidates),
            (json!([1, 2, 3]), UnwrapFailure::MissingCandidates),
            (json!({ "candidates": [{ "finishReason": "SAFETY" }] }), UnwrapFailure::MissingContent),
            (json!({ "candidates": [{ "content": {} }] }), UnwrapFailure::MissingParts),
            (json!({ "candidates": [{ "content": { "parts": [] } }] }), UnwrapFailure::MissingParts),
            (
                json!({ "candidates": [{ "content": { "parts": [{ "inlineData": {} }] } }] }),
                UnwrapFailure::MissingText,
            ),
            (
                json!({ "candidates": [{ "content": { "parts": [{ "text": 42 }] } }] }),
                UnwrapFailure::MissingText,
            ),
        ];

        for (raw, expected) in cases {
            match unwrap_payload(raw.clone()) {
                Description::Unparsed { failure, raw: kept } => {
                    assert_eq!(failure, expected, "payload {raw}");
                    assert_eq!(kept, raw);
                }
                other => panic!("expected failure for {raw}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn describe_sends_one_request_and_returns_html() {
        let provider = Arc::new(MockVisionProvider::answering("<h2>Organic</h2>"));
        let describer = Describer::new(provider.clone());

        let description = describer.describe(&png_upload()).await.unwrap();

        assert_eq!(description, Description::Html("<h2>Organic</h2>".into()));
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0], Describer::build_request(&png_upload()));
    }

    #[tokio::test]
    async fn describe_keeps_error_payload_from_non_success_status() {
        let provider = Arc::new(MockVisionProvider::replying(ProviderReply {
            status: 403,
            body: json!({ "error": { "code": 403, "message": "API key not valid" } }),
        }));
        let describer = Describer::new(provider);

        let description = describer.describe(&png_upload()).await.unwrap();

        assert_eq!(description.failure(), Some(UnwrapFailure::MissingCandidates));
    }

    #[tokio::test]
    async fn empty_upload_is_still_forwarded() {
        let provider = Arc::new(MockVisionProvider::answering("<h2>Not organic</h2>"));
        let describer = Describer::new(provider.clone());
        let upload = Upload::new("image/png", Vec::new());
        assert!(upload.is_empty());

        let description = describer.describe(&upload).await.unwrap();

        assert_eq!(description, Description::Html("<h2>Not organic</h2>".into()));
        assert_eq!(provider.requests()[0].inline_data().unwrap().data, "");
    }

    #[tokio::test]
    async fn describe_propagates_network_failure() {
        let describer = Describer::new(Arc::new(MockVisionProvider::failing("connection reset")));

        let err = describer.describe(&png_upload()).await.unwrap_err();

        assert!(matches!(err, ProviderError::NetworkError(_)));
    }
}
