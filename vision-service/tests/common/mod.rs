//! Shared helpers for vision-service integration tests.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tower::ServiceExt;
use vision_service::config::{GeminiSettings, UploadConfig, VisionConfig};
use vision_service::services::providers::VisionProvider;
use vision_service::startup::{build_router, AppState};

pub const BOUNDARY: &str = "vision-test-boundary-7MA4YWxkTrZu0gW";
pub const TEST_API_KEY: &str = "test-api-key";

/// One multipart part.
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name: "file",
            file_name: Some("upload.bin"),
            content_type: Some(content_type),
            data,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn describe_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/describe-image")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn test_config(api_base: Option<&str>, max_upload_bytes: usize) -> VisionConfig {
    let mut gemini = GeminiSettings::new(TEST_API_KEY);
    if let Some(base) = api_base {
        gemini.api_base = base.to_string();
    }

    VisionConfig {
        common: CoreConfig {
            port: 0,
            ..CoreConfig::default()
        },
        gemini,
        upload: UploadConfig {
            max_bytes: max_upload_bytes,
        },
        otlp_endpoint: None,
    }
}

pub fn router_with(provider: Arc<dyn VisionProvider>) -> Router {
    build_router(AppState::new(
        test_config(None, UploadConfig::default().max_bytes),
        provider,
    ))
}

pub async fn send(router: Router, request: Request<Body>) -> Response<Body> {
    router.oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
