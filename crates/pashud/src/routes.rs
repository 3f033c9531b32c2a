//! API routes for pashud

use crate::server::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use pashu_shared::envelope::iso_timestamp;
use pashu_shared::{ErrorBody, HealthResponse, HomeResponse, PredictError, ResponseEnvelope};
use std::sync::Arc;
use tracing::{error, info, warn};

type AppStateArc = Arc<AppState>;

/// Multipart field expected to carry the image
const FILE_FIELD: &str = "file";

/// Error response rendered as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.detail))).into_response()
    }
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        if let PredictError::Internal(detail) = &e {
            error!("  Prediction failed: {}", detail);
        }
        let status =
            StatusCode::from_u16(e.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, e.public_detail())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        warn!("  Malformed upload: {}", e.body_text());
        // Oversized bodies keep their 413
        let status = match e.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, e.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(e: MultipartRejection) -> Self {
        warn!("  Rejected upload: {}", e.body_text());
        Self::bad_request(e.body_text())
    }
}

// ============================================================================
// Prediction
// ============================================================================

pub fn predict_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/predict/", post(predict))
        .route("/predict", post(predict))
}

/// File pulled out of a multipart form
#[derive(Debug, Default)]
struct FilePart {
    filename: String,
    bytes: Vec<u8>,
}

/// Take the `file` field, or failing that the first field with a filename.
async fn read_file_part(mut multipart: Multipart) -> Result<Option<FilePart>, MultipartError> {
    let mut fallback: Option<FilePart> = None;

    while let Some(field) = multipart.next_field().await? {
        let is_file_field = field.name() == Some(FILE_FIELD);
        let filename = field.file_name().map(str::to_string);

        if is_file_field {
            let bytes = field.bytes().await?;
            return Ok(Some(FilePart {
                filename: filename.unwrap_or_default(),
                bytes: bytes.to_vec(),
            }));
        }

        match filename {
            Some(filename) if fallback.is_none() => {
                let bytes = field.bytes().await?;
                fallback = Some(FilePart {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(fallback)
}

async fn predict(
    State(state): State<AppStateArc>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let part = read_file_part(multipart?)
        .await?
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;

    info!("  Prediction request for '{}'", part.filename);
    let envelope = state
        .orchestrator
        .predict(part.bytes, &part.filename)
        .await?;

    Ok(Json(envelope))
}

// ============================================================================
// Status
// ============================================================================

pub fn status_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
}

async fn home() -> Json<HomeResponse> {
    Json(HomeResponse::new(env!("CARGO_PKG_VERSION")))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: iso_timestamp(Utc::now()),
        services: state.orchestrator.service_status(),
        knowledge_chunks: state.orchestrator.knowledge_chunks(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
