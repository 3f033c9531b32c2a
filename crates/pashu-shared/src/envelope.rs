//! Outbound JSON payloads.

use crate::breed::BreedPrediction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The single artifact returned by `POST /predict/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Detection payload passed through untouched (`{}` when unavailable)
    pub detection: Value,
    pub breed_prediction: BreedPrediction,
    /// Explanation of an uncertain result
    pub rag_response: Option<String>,
    pub clarifying_questions: Option<String>,
    pub timestamp: String,
    /// Scratch name the upload was stored under
    pub file_processed: String,
}

impl ResponseEnvelope {
    pub fn new(detection: Option<Value>, breed_prediction: BreedPrediction, file_processed: &str) -> Self {
        Self {
            detection: detection.unwrap_or_else(empty_detection),
            breed_prediction,
            rag_response: None,
            clarifying_questions: None,
            timestamp: iso_timestamp(Utc::now()),
            file_processed: file_processed.to_string(),
        }
    }

    pub fn with_explanation(mut self, explanation: String) -> Self {
        self.rag_response = Some(explanation);
        self
    }

    pub fn with_questions(mut self, questions: String) -> Self {
        self.clarifying_questions = Some(questions);
        self
    }
}

fn empty_detection() -> Value {
    Value::Object(serde_json::Map::new())
}

pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

/// `{"detail": ...}` body used for every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Configured,
    Unconfigured,
}

impl ServiceState {
    pub fn from_configured(configured: bool) -> Self {
        if configured {
            ServiceState::Configured
        } else {
            ServiceState::Unconfigured
        }
    }
}

/// Credential status of each upstream service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub roboflow_detection: ServiceState,
    pub roboflow_breed: ServiceState,
    pub openai: ServiceState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointMap {
    pub predict: String,
    pub health: String,
}

/// Payload for `GET /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeResponse {
    pub message: String,
    pub status: String,
    pub version: String,
    pub endpoints: EndpointMap,
}

impl HomeResponse {
    pub fn new(version: &str) -> Self {
        Self {
            message: "PashuSuchak AI Backend is running successfully!".to_string(),
            status: "healthy".to_string(),
            version: version.to_string(),
            endpoints: EndpointMap {
                predict: "/predict/".to_string(),
                health: "/health".to_string(),
            },
        }
    }
}

/// Payload for `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub services: ServiceStatus,
    pub knowledge_chunks: usize,
    pub uptime_seconds: u64,
}
