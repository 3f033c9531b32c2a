//! Shared types and utilities for the PashuSuchak relay.
//!
//! Everything here is request-scoped data or pure logic: upload validation,
//! breed extraction and the explanation policy, clarifying questionnaires,
//! and the static breed knowledge base with its keyword retrieval.

pub mod breed;
pub mod clarify;
pub mod envelope;
pub mod error;
pub mod knowledge;
pub mod upload;

pub use breed::{top_prediction, BreedPrediction, ConfidencePolicy, UNCERTAIN_LABELS, UNKNOWN_BREED};
pub use clarify::{clarifying_questions, ClarifyingBand};
pub use envelope::{ErrorBody, HealthResponse, HomeResponse, ResponseEnvelope, ServiceState, ServiceStatus};
pub use error::{PredictError, UpstreamError};
pub use upload::{UploadedImage, DEFAULT_ALLOWED_EXTENSIONS};
