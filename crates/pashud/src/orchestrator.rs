//! Prediction orchestrator.
//!
//! Drives one upload through validation, scratch storage, detection, breed
//! classification and the optional explanation step, then assembles the
//! response envelope. Upstream failures degrade the envelope instead of
//! failing the request; only bad input and local I/O faults surface as
//! errors.

use crate::clients::{
    BreedClassifier, Detector, OpenAiGenerator, RoboflowClassifier, RoboflowDetector,
    TextGenerator,
};
use crate::config::Config;
use crate::explainer::{ExplainSettings, Explainer};
use crate::scratch::ScratchDir;
use anyhow::Result;
use pashu_shared::{
    top_prediction, ConfidencePolicy, PredictError,
    ResponseEnvelope, ServiceState, ServiceStatus, UpstreamError, UploadedImage,
};
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Handles to the three external services
#[derive(Clone)]
pub struct Services {
    pub detector: Arc<dyn Detector>,
    pub classifier: Arc<dyn BreedClassifier>,
    pub generator: Arc<dyn TextGenerator>,
}

impl Services {
    /// Real HTTP clients built from config
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            detector: Arc::new(RoboflowDetector::new(config.detection.clone())?),
            classifier: Arc::new(RoboflowClassifier::new(config.breed.clone())?),
            generator: Arc::new(OpenAiGenerator::new(config.text_generation.clone())?),
        })
    }
}

pub struct PredictionOrchestrator {
    detector: Arc<dyn Detector>,
    classifier: Arc<dyn BreedClassifier>,
    explainer: Explainer,
    scratch: ScratchDir,
    policy: ConfidencePolicy,
    allowed_extensions: Vec<String>,
    detection_timeout: Duration,
    breed_timeout: Duration,
}

impl PredictionOrchestrator {
    pub fn new(config: &Config, services: Services, knowledge_text: &str) -> Result<Self> {
        let scratch = ScratchDir::new(&config.uploads.scratch_dir)?;
        let explainer = Explainer::new(
            knowledge_text,
            &config.knowledge,
            services.generator,
            ExplainSettings::from_config(config),
        );

        Ok(Self {
            detector: services.detector,
            classifier: services.classifier,
            explainer,
            scratch,
            policy: config.policy,
            allowed_extensions: config.uploads.allowed_extensions.clone(),
            detection_timeout: config.detection_timeout(),
            breed_timeout: config.breed_timeout(),
        })
    }

    pub async fn predict(&self, bytes: Vec<u8>, filename: &str) -> Result<ResponseEnvelope, PredictError> {
        let upload = UploadedImage::new(bytes, filename, &self.allowed_extensions)?;
        info!(
            "Processing upload '{}' as {} ({} bytes)",
            upload.original_filename,
            upload.storage_name,
            upload.bytes.len()
        );

        // Deleted when `stored` drops, including when this future is dropped mid-call
        let stored = self
            .scratch
            .write(&upload.storage_name, &upload.bytes)
            .await
            .map_err(|e| {
                PredictError::internal(format!("Failed to store {}: {}", upload.storage_name, e))
            })?;

        let envelope = self.run_pipeline(stored.path(), &upload.storage_name).await;
        drop(stored);
        Ok(envelope)
    }

    async fn run_pipeline(&self, path: &Path, storage_name: &str) -> ResponseEnvelope {
        let detection = match with_timeout(self.detection_timeout, self.detector.detect(path)).await
        {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Detection failed for {}: {}", storage_name, e);
                None
            }
        };

        let breed_payload: Option<Value> =
            match with_timeout(self.breed_timeout, self.classifier.classify(path)).await {
                Ok(payload) => Some(payload),
                Err(e) => {
                    warn!("Breed classification failed for {}: {}", storage_name, e);
                    None
                }
            };

        let prediction = top_prediction(breed_payload.as_ref());
        info!(
            "Top breed for {}: {} ({:.2})",
            storage_name, prediction.breed, prediction.confidence
        );

        let mut envelope = ResponseEnvelope::new(detection, prediction.clone(), storage_name);

        if self.policy.needs_explanation(&prediction) {
            let explanation = self.explainer.explain(&prediction, storage_name).await;
            envelope = envelope.with_explanation(explanation);
        }

        if let Some(band) = self.policy.clarifying_band(&prediction) {
            envelope = envelope.with_questions(band.questions().to_string());
        }

        envelope
    }

    /// Which services have credentials
    pub fn service_status(&self) -> ServiceStatus {
        ServiceStatus {
            roboflow_detection: ServiceState::from_configured(self.detector.is_configured()),
            roboflow_breed: ServiceState::from_configured(self.classifier.is_configured()),
            openai: ServiceState::from_configured(self.explainer.generator_configured()),
        }
    }

    pub fn knowledge_chunks(&self) -> usize {
        self.explainer.knowledge_chunks()
    }
}

async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, UpstreamError>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| UpstreamError::Timeout(limit.as_secs()))?
}
