//! Roboflow serverless clients: detection workflow and hosted classifier.

use super::{encode_image, request_error, BreedClassifier, Detector};
use crate::config::{has_value, BreedConfig, DetectionConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use pashu_shared::UpstreamError;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const DETECTION_SERVICE: &str = "detection workflow";
const BREED_SERVICE: &str = "breed classifier";

fn build_http(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("pashud/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

async fn read_json(
    response: reqwest::Response,
    service: &'static str,
) -> Result<Value, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            service,
            status: status.as_u16(),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| UpstreamError::InvalidResponse(format!("{}: {}", service, e)))
}

/// Runs the detect-and-classify workflow on an image
pub struct RoboflowDetector {
    config: DetectionConfig,
    http: reqwest::Client,
}

impl RoboflowDetector {
    pub fn new(config: DetectionConfig) -> Result<Self> {
        let http = build_http(config.timeout_secs)?;
        Ok(Self { config, http })
    }

    pub fn workflow_url(&self) -> String {
        format!(
            "{}/{}/workflows/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.workspace,
            self.config.workflow_id
        )
    }
}

#[async_trait]
impl Detector for RoboflowDetector {
    async fn detect(&self, image: &Path) -> Result<Value, UpstreamError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(UpstreamError::NotConfigured(DETECTION_SERVICE))?;

        let encoded = encode_image(image).await?;
        let body = serde_json::json!({
            "api_key": api_key,
            "inputs": {
                "image": {"type": "base64", "value": encoded}
            },
            "use_cache": self.config.use_cache,
        });

        let url = self.workflow_url();
        debug!("Running detection workflow {}", url);

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(e, self.config.timeout_secs))?;

        read_json(response, DETECTION_SERVICE).await
    }

    fn is_configured(&self) -> bool {
        has_value(&self.config.api_key)
    }
}

/// Calls the hosted breed classification model
pub struct RoboflowClassifier {
    config: BreedConfig,
    http: reqwest::Client,
}

impl RoboflowClassifier {
    pub fn new(config: BreedConfig) -> Result<Self> {
        let http = build_http(config.timeout_secs)?;
        Ok(Self { config, http })
    }

    pub fn model_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.model_id.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl BreedClassifier for RoboflowClassifier {
    async fn classify(&self, image: &Path) -> Result<Value, UpstreamError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(UpstreamError::NotConfigured(BREED_SERVICE))?;

        let encoded = encode_image(image).await?;
        let url = self.model_url();
        debug!("Classifying breed with {}", url);

        // Hosted models take the raw base64 image as a form-encoded body
        let response = self
            .http
            .post(&url)
            .query(&[("api_key", api_key)])
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(encoded)
            .send()
            .await
            .map_err(|e| request_error(e, self.config.timeout_secs))?;

        read_json(response, BREED_SERVICE).await
    }

    fn is_configured(&self) -> bool {
        has_value(&self.config.api_key)
    }
}
