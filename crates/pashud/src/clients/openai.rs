//! OpenAI-compatible chat completion client.

use super::{request_error, GenerationRequest, TextGenerator};
use crate::config::{has_value, TextGenerationConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use pashu_shared::UpstreamError;
use std::time::Duration;

const SERVICE: &str = "text generation";

pub struct OpenAiGenerator {
    config: TextGenerationConfig,
    http: reqwest::Client,
}

impl OpenAiGenerator {
    pub fn new(config: TextGenerationConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { config, http })
    }

    pub fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    fn request_body(&self, request: &GenerationRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": request.user_prompt},
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        })
    }
}

/// Pull `choices[0].message.content` out of a completion response.
fn extract_content(response: &serde_json::Value) -> Result<String, UpstreamError> {
    let text = response
        .get("choices")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("message"))
        .and_then(|v| v.get("content"))
        .and_then(|v| v.as_str())
        .ok_or(UpstreamError::EmptyResponse)?;

    let text = text.trim();
    if text.is_empty() {
        return Err(UpstreamError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, UpstreamError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(UpstreamError::NotConfigured(SERVICE))?;

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| request_error(e, self.config.timeout_secs))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: response.status().as_u16(),
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        extract_content(&json)
    }

    fn is_configured(&self) -> bool {
        has_value(&self.config.api_key)
    }
}
