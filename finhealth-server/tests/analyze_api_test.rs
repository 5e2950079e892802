//! End-to-end API tests.
//!
//! Drives the real router in-process: auth, file upload, JSON analysis,
//! the integrations stubs, and the assessments listing.

use axum::body::Body;
use http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use finhealth_common::config::Config;
use finhealth_server::analysis::HealthAnalyzer;
use finhealth_server::storage::AssessmentStore;
use finhealth_server::{router, AppState};

const API_KEY: &str = "test-key";
const BOUNDARY: &str = "finhealth-test-boundary";

fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.api_key = Some(API_KEY.to_string());
    config.storage.enabled = false;
    config
}

fn test_router(config: Config) -> axum::Router {
    let analyzer = HealthAnalyzer::from_config(&config.analysis);
    let store = if config.storage.enabled {
        Some(AssessmentStore::in_memory().expect("in-memory store"))
    } else {
        None
    };

    router(Arc::new(AppState {
        config,
        analyzer,
        store,
    }))
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse response JSON")
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(body.to_string()))
        .expect("build request")
}

fn multipart_request(uri: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header("x-api-key", API_KEY)
        .body(Body::from(body))
        .expect("build request")
}

fn sample_records() -> Value {
    json!([
        {"Sales": 1000, "cost": 700, "ar": 150, "ap": 80, "debt": 50},
        {"Sales": 1100, "cost": 740, "ar": 160, "ap": 85, "debt": 50},
        {"Sales": 1200, "cost": 780, "ar": 170, "ap": 90, "debt": 50},
        {"Sales": 1300, "cost": 820, "ar": 180, "ap": 95, "debt": 50}
    ])
}

// ============================================================================
// Health & Auth
// ============================================================================

#[tokio::test]
async fn test_health_needs_no_api_key() {
    let app = test_router(test_config());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "finhealth-server");
}

#[tokio::test]
async fn test_missing_api_key_rejected() {
    let app = test_router(test_config());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/analyze-json")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"industry": "Retail", "records": []}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Invalid API key"));
}

#[tokio::test]
async fn test_wrong_api_key_rejected() {
    let app = test_router(test_config());

    let mut request = json_request("/analyze-json", json!({"records": []}));
    request
        .headers_mut()
        .insert("x-api-key", "wrong".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_disabled_when_no_key_configured() {
    let mut config = test_config();
    config.auth.api_key = None;
    let app = test_router(config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/integrations/bank-a")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// JSON Analysis
// ============================================================================

#[tokio::test]
async fn test_analyze_json_full_response() {
    let app = test_router(test_config());

    let request = json_request(
        "/analyze-json",
        json!({"industry": "Manufacturing", "records": sample_records()}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    assert_eq!(body["industry"], "Manufacturing");
    assert_eq!(body["revenue"], 4600.0);
    assert_eq!(body["expenses"], 3040.0);
    assert!(body["risk_score"].as_f64().unwrap() > 0.0);
    assert!(body["creditworthiness"].is_string());
    assert_eq!(body["benchmarks"]["dso_days"], 45.0);
    assert_eq!(body["forecast"]["revenue"].as_array().unwrap().len(), 3);
    assert!(body["scenarios"]["pessimistic"]["net_income"].is_number());
    assert!(body["default_probability"].is_number());
    assert!(body["recommendations"].is_array());
    assert!(!body["recommendations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_json_defaults_to_services() {
    let app = test_router(test_config());

    let request = json_request("/analyze-json", json!({"records": sample_records()}));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["industry"], "Services");
    assert_eq!(body["benchmarks"]["dso_days"], 35.0);
}

#[tokio::test]
async fn test_analyze_json_missing_required_fields() {
    let app = test_router(test_config());

    let request = json_request(
        "/analyze-json",
        json!({"industry": "Retail", "records": [{"month": "Jan"}]}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Missing required fields"));
}

// ============================================================================
// File Upload Analysis
// ============================================================================

#[tokio::test]
async fn test_analyze_csv_upload() {
    let app = test_router(test_config());

    let csv = b"month,Sales,Operating Expenses,accounts_receivable\n\
Jan,1000,700,150\n\
Feb,1100,740,160\n\
Mar,1200,780,170\n";
    let request = multipart_request("/analyze?industry=Retail", "records.csv", csv);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    assert_eq!(body["industry"], "Retail");
    assert_eq!(body["revenue"], 3300.0);
    assert_eq!(body["benchmarks"]["dso_days"], 25.0);
    // AR present, so DSO is non-zero
    assert!(body["dso_days"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_unsupported_upload_type() {
    let app = test_router(test_config());

    let request = multipart_request("/analyze", "records.docx", b"binary blob");
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("Unsupported file type"));
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = test_router(test_config());

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n");
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header("x-api-key", API_KEY)
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("Missing file upload"));
}

// ============================================================================
// Integrations & Assessments
// ============================================================================

#[tokio::test]
async fn test_bank_integration_stubs() {
    let app = test_router(test_config());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/integrations/bank-a")
                .header("x-api-key", API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["provider"], "MockBank A");
    assert_eq!(body["accounts"], 2);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/integrations/bank-b")
                .header("x-api-key", API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["provider"], "MockBank B");
    assert_eq!(body["card_sales"], 95000.0);
}

#[tokio::test]
async fn test_assessments_are_persisted_and_listed() {
    let mut config = test_config();
    config.storage.enabled = true;
    let app = test_router(config);

    for industry in ["Retail", "Logistics"] {
        let request = json_request(
            "/analyze-json",
            json!({"industry": industry, "records": sample_records()}),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/assessments?limit=10")
                .header("x-api-key", API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["count"], 2);
    // newest first
    assert_eq!(body["assessments"][0]["industry"], "Logistics");
    assert_eq!(body["assessments"][1]["industry"], "Retail");
    assert!(body["assessments"][0]["risk_score"].is_number());
}

#[tokio::test]
async fn test_assessments_empty_without_storage() {
    let app = test_router(test_config());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/assessments")
                .header("x-api-key", API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["count"], 0);
}
