//! FinHealth Server Library
//!
//! HTTP API that turns a small business's financial records (CSV/Excel/PDF
//! upload or JSON payload) into a financial-health assessment: standard
//! ratios, a 0-100 risk score with a credit tier, statistical extras
//! (trend forecast, outlier flags, scenarios, default probability), and
//! human-readable recommendations.
//!
//! # Request Flow
//!
//! ```text
//! upload / JSON payload
//!        │
//!        ▼
//!   ingest::RecordTable      column canonicalization + aliases
//!        │
//!        ▼
//!   analysis::HealthAnalyzer  ratios → score → tier → extras
//!        │
//!        ├──► storage::AssessmentStore   (best-effort persistence)
//!        ▼
//!   routes::AssessmentResponse           report + recommendations
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod ingest;
pub mod integrations;
pub mod routes;
pub mod storage;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::{middleware, routing::get, routing::post, Router};
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::Method;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use finhealth_common::config::Config;

use crate::analysis::HealthAnalyzer;
use crate::storage::AssessmentStore;

/// Largest accepted upload, in bytes.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared service state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Analysis pipeline
    pub analyzer: HealthAnalyzer,
    /// Assessment persistence; `None` when disabled or unavailable
    pub store: Option<AssessmentStore>,
}

impl AppState {
    /// Create service state from configuration.
    ///
    /// A storage failure downgrades persistence instead of refusing to
    /// start: the analysis endpoints are the service's reason to exist.
    pub fn new(config: Config) -> Self {
        let analyzer = HealthAnalyzer::from_config(&config.analysis);

        let store = if config.storage.enabled {
            match AssessmentStore::new(&config.storage) {
                Ok(store) => Some(store),
                Err(e) => {
                    tracing::warn!(error = %e, "Assessment store unavailable, persistence disabled");
                    None
                }
            }
        } else {
            None
        };

        Self {
            config,
            analyzer,
            store,
        }
    }
}

/// Build the HTTP router over the given state.
///
/// Every route except `/health` sits behind the API-key middleware (a
/// no-op when no key is configured).
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/analyze", post(routes::analyze_upload))
        .route("/analyze-json", post(routes::analyze_json))
        .route("/assessments", get(routes::list_assessments))
        .route("/integrations/bank-a", get(routes::bank_a))
        .route("/integrations/bank-b", get(routes::bank_b))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::require_api_key,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .merge(protected)
        .layer(cors_layer(&state.config))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors
        .origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-api-key")])
        .allow_credentials(true)
}

/// Main API service
pub struct ApiService {
    state: Arc<AppState>,
}

impl ApiService {
    /// Create a new API service
    pub fn new(config: Config) -> Self {
        let state = Arc::new(AppState::new(config));
        Self { state }
    }

    /// Start the HTTP server.
    pub async fn start(self) -> Result<()> {
        let host = self.state.config.server.host.clone();
        let port = self.state.config.server.port;

        let app = router(self.state);

        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        tracing::info!(address = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
