//! External service clients.
//!
//! Each upstream sits behind a trait so the orchestrator can be driven by
//! the real HTTP clients in production and by fakes in tests.

pub mod fake;
pub mod openai;
pub mod roboflow;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use pashu_shared::UpstreamError;
use serde_json::Value;
use std::path::Path;

pub use fake::{FakeBreedClassifier, FakeDetector, FakeTextGenerator};
pub use openai::OpenAiGenerator;
pub use roboflow::{RoboflowClassifier, RoboflowDetector};

/// Object-detection workflow. The payload is opaque to us.
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, image: &Path) -> Result<Value, UpstreamError>;

    fn is_configured(&self) -> bool;
}

/// Breed classifier returning `{"predictions": [{"class", "confidence"}, ..]}`.
#[async_trait]
pub trait BreedClassifier: Send + Sync {
    async fn classify(&self, image: &Path) -> Result<Value, UpstreamError>;

    fn is_configured(&self) -> bool;
}

/// Prompt sent to the text-generation service
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Free-text completion service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, UpstreamError>;

    fn is_configured(&self) -> bool;
}

/// Read an image from disk and base64 encode it for upload.
pub(crate) async fn encode_image(path: &Path) -> Result<String, UpstreamError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| UpstreamError::Io(format!("{}: {}", path.display(), e)))?;
    Ok(STANDARD.encode(bytes))
}

/// Map a reqwest failure, keeping timeouts distinct.
pub(crate) fn request_error(e: reqwest::Error, timeout_secs: u64) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout(timeout_secs)
    } else {
        UpstreamError::Http(format!("Request failed: {}", e))
    }
}
