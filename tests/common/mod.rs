#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use flux_gateway::{AppConfig, GeneratedImage, GenerationRequest, ImageGenerator, ServiceError};

pub const BOUNDARY: &str = "----flux-gateway-test-boundary";

pub fn test_config(base_url: &str) -> AppConfig {
    let base_url = base_url.to_string();
    AppConfig::from_lookup(move |key| match key {
        "CLOUDFLARE_ACCOUNT_ID" => Some("acct-123".into()),
        "CLOUDFLARE_API_TOKEN" => Some("token-abc".into()),
        "WORKERS_AI_BASE_URL" => Some(base_url.clone()),
        _ => None,
    })
    .expect("test config")
}

/// Hand-assembled multipart/form-data body.
#[derive(Default)]
pub struct MultipartBody {
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.buf
    }
}

/// Records every request it sees and answers with a canned outcome.
pub struct RecordingGenerator {
    outcome: Result<String, String>,
    seen: Mutex<Vec<GenerationRequest>>,
}

impl RecordingGenerator {
    pub fn succeeding(image: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(image.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn last_request(&self) -> GenerationRequest {
        self.seen
            .lock()
            .last()
            .cloned()
            .expect("generator was never called")
    }
}

#[async_trait]
impl ImageGenerator for RecordingGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, ServiceError> {
        self.seen.lock().push(request.clone());
        match &self.outcome {
            Ok(image) => Ok(GeneratedImage {
                image: image.clone(),
            }),
            Err(message) => Err(ServiceError::Generation(message.clone())),
        }
    }
}
