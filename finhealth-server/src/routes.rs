//! HTTP routes for the assessment service.

use axum::{
    extract::{Multipart, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use finhealth_common::error::Error;
use finhealth_common::logging::generate_request_id;
use finhealth_common::request_span;

use crate::analysis::types::HealthReport;
use crate::ingest::{parse_upload, RecordTable};
use crate::integrations;
use crate::storage::AssessmentSummary;
use crate::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}

/// Query parameters for the upload analyze endpoint.
#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    #[serde(default = "default_industry")]
    pub industry: String,
}

/// JSON analyze request: industry plus one object per reporting period.
#[derive(Debug, Deserialize)]
pub struct AnalyzeJsonRequest {
    #[serde(default = "default_industry")]
    pub industry: String,
    #[serde(default)]
    pub records: Vec<serde_json::Value>,
}

fn default_industry() -> String {
    "Services".to_string()
}

/// Full assessment response: the report plus recommendations.
#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    #[serde(flatten)]
    pub report: HealthReport,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssessmentsQuery {
    #[serde(default = "default_assessment_limit")]
    pub limit: usize,
}

fn default_assessment_limit() -> usize {
    20
}

#[derive(Debug, Serialize)]
pub struct AssessmentsResponse {
    pub assessments: Vec<AssessmentSummary>,
    pub count: usize,
}

// ============================================================================
// Error Adapter
// ============================================================================

/// Route-level error: serializes as `{"detail": "..."}` with the status
/// code carried by the underlying error.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(Error::Internal(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = Json(serde_json::json!({ "detail": self.0.to_string() }));
        (status, body).into_response()
    }
}

// ============================================================================
// Auth Middleware
// ============================================================================

/// Require a matching `X-API-Key` header when a key is configured.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.config.auth.required_key() {
        let provided = request
            .headers()
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if provided != expected {
            return Err(Error::Auth("Invalid API key".into()).into());
        }
    }

    Ok(next.run(request).await)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: "finhealth-server".to_string(),
    })
}

/// Analyze an uploaded CSV/Excel/PDF file.
pub async fn analyze_upload(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyzeQuery>,
    mut multipart: Multipart,
) -> Result<Json<AssessmentResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| Error::InvalidInput(format!("Failed to read upload: {}", e)))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let (filename, bytes) =
        upload.ok_or_else(|| Error::InvalidInput("Missing file upload".into()))?;

    tracing::info!(
        filename = %filename,
        size_bytes = bytes.len(),
        industry = %query.industry,
        "Received file for analysis"
    );

    let table = parse_upload(&filename, &bytes)?;
    run_analysis(&state, table, &query.industry).await
}

/// Analyze an inline JSON payload of records.
pub async fn analyze_json(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeJsonRequest>,
) -> Result<Json<AssessmentResponse>, ApiError> {
    let table = RecordTable::from_json_records(&payload.records);
    run_analysis(&state, table, &payload.industry).await
}

/// Shared tail of both analyze endpoints: pipeline, recommendations,
/// best-effort persistence.
async fn run_analysis(
    state: &AppState,
    table: RecordTable,
    industry: &str,
) -> Result<Json<AssessmentResponse>, ApiError> {
    let request_id = generate_request_id();

    let report = {
        let span = request_span!("analyze", request_id, industry = %industry, rows = table.rows());
        let _enter = span.enter();
        state.analyzer.analyze(&table, industry)?
    };
    let recommendations = crate::analysis::build_recommendations(&report);

    if let Some(store) = &state.store {
        if let Err(e) = store.save_assessment(&report).await {
            tracing::warn!(error = %e, "Failed to persist assessment");
        }
    }

    Ok(Json(AssessmentResponse {
        report,
        recommendations,
    }))
}

/// Recent persisted assessments, newest first.
pub async fn list_assessments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssessmentsQuery>,
) -> Result<Json<AssessmentsResponse>, ApiError> {
    let assessments = match &state.store {
        Some(store) => store.recent(query.limit).await?,
        None => Vec::new(),
    };
    let count = assessments.len();

    Ok(Json(AssessmentsResponse { assessments, count }))
}

/// Mock bank integration summary.
pub async fn bank_a() -> Json<integrations::BankAccountSummary> {
    Json(integrations::bank_a_summary())
}

/// Mock payment-provider integration summary.
pub async fn bank_b() -> Json<integrations::PaymentRailSummary> {
    Json(integrations::bank_b_summary())
}

// ============================================================================
// Tests
// ============================================================================
