//! FinHealth Server - Financial health assessment API for small businesses.
//!
//! Ingests financial records (CSV/Excel/PDF or JSON), scores financial
//! health, and returns a risk tier with recommendations.

use anyhow::Result;
use finhealth_common::config::Config;
use finhealth_common::logging::init_logging;
use finhealth_server::ApiService;

#[tokio::main]
async fn main() -> Result<()> {
    // Start timing immediately for cold-start measurement
    let startup_start = std::time::Instant::now();

    // Load and validate configuration
    let config = Config::load_and_validate()?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("FinHealth Server v{}", env!("CARGO_PKG_VERSION"));

    let service = ApiService::new(config);

    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        "Service initialized in {:?}",
        startup_duration
    );

    service.start().await
}
