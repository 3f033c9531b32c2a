//! Fake upstream clients for deterministic tests.
//!
//! Each fake returns a pre-configured result, counts its calls, and records
//! what it was asked, so tests can assert on orchestration without network.

use super::{BreedClassifier, Detector, GenerationRequest, TextGenerator};
use async_trait::async_trait;
use pashu_shared::UpstreamError;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted response shared by the fakes
struct Script<T: Clone> {
    response: Result<T, UpstreamError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl<T: Clone> Script<T> {
    fn new(response: Result<T, UpstreamError>) -> Self {
        Self {
            response,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    async fn play(&self) -> Result<T, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Image paths seen by a fake, with whether the file existed at call time
#[derive(Default)]
struct SeenImages(Mutex<Vec<(PathBuf, bool)>>);

impl SeenImages {
    fn record(&self, path: &Path) {
        if let Ok(mut seen) = self.0.lock() {
            seen.push((path.to_path_buf(), path.exists()));
        }
    }

    fn all(&self) -> Vec<(PathBuf, bool)> {
        self.0.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

// ============================================================================
// Detector
// ============================================================================

pub struct FakeDetector {
    script: Script<Value>,
    seen: SeenImages,
}

impl FakeDetector {
    pub fn returning(payload: Value) -> Self {
        Self {
            script: Script::new(Ok(payload)),
            seen: SeenImages::default(),
        }
    }

    pub fn failing(error: UpstreamError) -> Self {
        Self {
            script: Script::new(Err(error)),
            seen: SeenImages::default(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.script.call_count()
    }

    pub fn seen_images(&self) -> Vec<(PathBuf, bool)> {
        self.seen.all()
    }
}

#[async_trait]
impl Detector for FakeDetector {
    async fn detect(&self, image: &Path) -> Result<Value, UpstreamError> {
        self.seen.record(image);
        self.script.play().await
    }

    fn is_configured(&self) -> bool {
        true
    }
}

// ============================================================================
// Breed classifier
// ============================================================================

pub struct FakeBreedClassifier {
    script: Script<Value>,
    seen: SeenImages,
}

impl FakeBreedClassifier {
    pub fn returning(payload: Value) -> Self {
        Self {
            script: Script::new(Ok(payload)),
            seen: SeenImages::default(),
        }
    }

    /// Classifier whose ranked list has a single entry
    pub fn with_top(breed: &str, confidence: f64) -> Self {
        Self::returning(serde_json::json!({
            "predictions": [{"class": breed, "confidence": confidence}]
        }))
    }

    pub fn failing(error: UpstreamError) -> Self {
        Self {
            script: Script::new(Err(error)),
            seen: SeenImages::default(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.script.call_count()
    }

    pub fn seen_images(&self) -> Vec<(PathBuf, bool)> {
        self.seen.all()
    }
}

#[async_trait]
impl BreedClassifier for FakeBreedClassifier {
    async fn classify(&self, image: &Path) -> Result<Value, UpstreamError> {
        self.seen.record(image);
        self.script.play().await
    }

    fn is_configured(&self) -> bool {
        true
    }
}

// ============================================================================
// Text generator
// ============================================================================

pub struct FakeTextGenerator {
    script: Script<String>,
    requests: Mutex<Vec<GenerationRequest>>,
    configured: bool,
}

impl FakeTextGenerator {
    pub fn returning(text: &str) -> Self {
        Self {
            script: Script::new(Ok(text.to_string())),
            requests: Mutex::new(Vec::new()),
            configured: true,
        }
    }

    pub fn failing(error: UpstreamError) -> Self {
        Self {
            script: Script::new(Err(error)),
            requests: Mutex::new(Vec::new()),
            configured: true,
        }
    }

    /// Generator that reports missing credentials and refuses every call
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::failing(UpstreamError::NotConfigured("text generation"))
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.script.call_count()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for FakeTextGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, UpstreamError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.script.play().await
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}
