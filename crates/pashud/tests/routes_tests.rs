//! HTTP route tests
//!
//! The router is driven in-process with `oneshot`; upstream services are
//! fakes so status codes and payloads are deterministic.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pashu_shared::knowledge::DEFAULT_KNOWLEDGE;
use pashud::clients::{FakeBreedClassifier, FakeDetector, FakeTextGenerator};
use pashud::{build_router, AppState, Config, PredictionOrchestrator, Services};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "pashu-test-boundary";

fn app_with(classifier: FakeBreedClassifier, max_upload_bytes: usize) -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.uploads.scratch_dir = dir.path().join("uploads");

    let services = Services {
        detector: Arc::new(FakeDetector::returning(json!({"outputs": []}))),
        classifier: Arc::new(classifier),
        generator: Arc::new(FakeTextGenerator::unconfigured()),
    };
    let orchestrator = PredictionOrchestrator::new(&config, services, DEFAULT_KNOWLEDGE).unwrap();

    (dir, build_router(AppState::new(orchestrator), max_upload_bytes))
}

fn app() -> (TempDir, Router) {
    app_with(FakeBreedClassifier::with_top("Gir", 0.92), 10 * 1024 * 1024)
}

/// One multipart part: (field name, optional filename, content)
fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// ============================================================================
// POST /predict/
// ============================================================================

#[tokio::test]
async fn test_predict_returns_envelope() {
    let (_dir, app) = app();
    let body = multipart_body(&[("file", Some("cow.jpg"), b"jpeg bytes")]);

    let (status, json) = send(app, upload_request("/predict/", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["breed_prediction"]["breed"], "Gir");
    assert_eq!(json["breed_prediction"]["confidence"], 0.92);
    assert_eq!(json["detection"], json!({"outputs": []}));
    assert!(json["rag_response"].is_null());
    assert!(json["clarifying_questions"].is_null());
    assert!(json["timestamp"].is_string());
    assert!(json["file_processed"].as_str().unwrap().ends_with(".jpg"));
}

#[tokio::test]
async fn test_predict_without_trailing_slash() {
    let (_dir, app) = app();
    let body = multipart_body(&[("file", Some("cow.png"), b"png")]);

    let (status, _) = send(app, upload_request("/predict", body)).await;
    assert_eq!(status, StatusCode::OK);
}

/// Low confidence with no text service: static message plus questions
#[tokio::test]
async fn test_predict_uncertain_without_text_service() {
    let (_dir, app) = app_with(
        FakeBreedClassifier::with_top("Sahiwal", 0.42),
        10 * 1024 * 1024,
    );
    let body = multipart_body(&[("file", Some("cow.png"), b"png")]);

    let (status, json) = send(app, upload_request("/predict/", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["rag_response"]
        .as_str()
        .unwrap()
        .contains("currently unavailable"));
    assert!(json["clarifying_questions"]
        .as_str()
        .unwrap()
        .contains("moderate confidence"));
}

#[tokio::test]
async fn test_predict_rejects_disallowed_type() {
    let (_dir, app) = app();
    let body = multipart_body(&[("file", Some("cow.txt"), b"moo")]);

    let (status, json) = send(app, upload_request("/predict/", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["detail"],
        "File type not allowed. Supported types: .bmp, .gif, .jpeg, .jpg, .png, .webp"
    );
}

#[tokio::test]
async fn test_predict_without_file_part() {
    let (_dir, app) = app();
    let body = multipart_body(&[("note", None, b"hello")]);

    let (status, json) = send(app, upload_request("/predict/", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "No file provided");
}

#[tokio::test]
async fn test_predict_empty_filename() {
    let (_dir, app) = app();
    let body = multipart_body(&[("file", Some(""), b"x")]);

    let (status, json) = send(app, upload_request("/predict/", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "No file provided");
}

/// A differently named part still counts when it carries a filename
#[tokio::test]
async fn test_predict_falls_back_to_first_file_part() {
    let (_dir, app) = app();
    let body = multipart_body(&[
        ("note", None, b"taken at the farm"),
        ("image", Some("cow.jpeg"), b"jpeg"),
    ]);

    let (status, json) = send(app, upload_request("/predict/", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["file_processed"].as_str().unwrap().ends_with(".jpeg"));
}

#[tokio::test]
async fn test_predict_rejects_non_multipart() {
    let (_dir, app) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/predict/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].is_string());
}

/// Local storage failure: generic 500, no paths or IO text in the body
#[tokio::test]
async fn test_predict_storage_failure_is_opaque_500() {
    let (dir, app) = app();
    let scratch = dir.path().join("uploads");
    std::fs::remove_dir_all(&scratch).unwrap();
    let body = multipart_body(&[("file", Some("cow.jpg"), b"jpeg")]);

    let response = app.oneshot(upload_request("/predict/", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json, json!({"detail": "Internal server error"}));
    assert!(!text.contains("uploads"));
    assert!(!text.contains("Failed to store"));
    assert!(!scratch.exists());
}

#[tokio::test]
async fn test_predict_rejects_oversized_body() {
    let (_dir, app) = app_with(FakeBreedClassifier::with_top("Gir", 0.92), 256);
    let body = multipart_body(&[("file", Some("cow.jpg"), &[0u8; 1024])]);

    let response = app
        .oneshot(upload_request("/predict/", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// ============================================================================
// Status
// ============================================================================

#[tokio::test]
async fn test_home() {
    let (_dir, app) = app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "PashuSuchak AI Backend is running successfully!");
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["endpoints"]["predict"], "/predict/");
    assert_eq!(json["endpoints"]["health"], "/health");
}

#[tokio::test]
async fn test_health_reports_services() {
    let (_dir, app) = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["services"]["roboflow_detection"], "configured");
    assert_eq!(json["services"]["roboflow_breed"], "configured");
    assert_eq!(json["services"]["openai"], "unconfigured");
    assert!(json["knowledge_chunks"].as_u64().unwrap() > 0);
    assert!(json["uptime_seconds"].is_u64());
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (_dir, app) = app();
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
