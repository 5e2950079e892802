//! Financial health analysis pipeline.
//!
//! The pipeline runs once per request over a [`RecordTable`]:
//!
//! 1. Core ratios: profitability, liquidity, collection speed, coverage
//!    ([`metrics`])
//! 2. Composite risk score and credit tier ([`metrics`], [`types`])
//! 3. Statistical extras: trend forecast ([`forecast`]), outlier flags
//!    ([`outlier`]), scenario deltas ([`scenario`]), default probability
//!    ([`credit`])
//! 4. Human-readable recommendations ([`recommend`])
//!
//! Everything is arithmetic over a small in-memory table; there is no model
//! state carried between requests.

pub mod credit;
pub mod forecast;
pub mod metrics;
pub mod outlier;
pub mod recommend;
pub mod scenario;
pub mod types;

use finhealth_common::config::AnalysisConfig;
use finhealth_common::error::Result;

use crate::ingest::RecordTable;
use forecast::TrendForecaster;
use outlier::OutlierDetector;
use types::{CreditTier, HealthReport, Industry};

pub use recommend::build_recommendations;

/// Per-request analysis pipeline.
pub struct HealthAnalyzer {
    forecast_periods: usize,
    outlier_threshold: f64,
}

impl HealthAnalyzer {
    /// Create an analyzer with default tunables.
    pub fn new() -> Self {
        Self {
            forecast_periods: 3,
            outlier_threshold: 2.5,
        }
    }

    /// Create an analyzer from service configuration.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            forecast_periods: config.forecast_periods,
            outlier_threshold: config.outlier_threshold,
        }
    }

    /// Run the full pipeline over a record table.
    ///
    /// `industry` is the caller-supplied label; unknown industries are
    /// benchmarked as Services but echoed verbatim in the report.
    pub fn analyze(&self, table: &RecordTable, industry: &str) -> Result<HealthReport> {
        let core = metrics::compute_core_metrics(table)?;

        let benchmarks = Industry::from_name(industry)
            .unwrap_or(Industry::Services)
            .benchmarks();

        let risk_score = metrics::risk_score(&core);
        let creditworthiness = CreditTier::from_score(risk_score);
        let flags = metrics::benchmark_flags(&core, &benchmarks);

        let forecast = TrendForecaster::new(self.forecast_periods).forecast(table);
        let anomalies = OutlierDetector::new(self.outlier_threshold).detect(table);
        let scenarios = scenario::build_scenarios(&core);
        let default_probability = credit::default_probability(&core);
        let credit_risk_factors = credit::risk_factors(&core);

        tracing::debug!(
            industry = %industry,
            rows = table.rows(),
            risk_score,
            tier = %creditworthiness,
            "Analysis complete"
        );

        Ok(HealthReport {
            industry: industry.to_string(),
            revenue: core.revenue,
            expenses: core.expenses,
            net_income: core.net_income,
            net_margin: core.net_margin,
            net_cashflow: core.net_cashflow,
            current_ratio: core.current_ratio,
            dso_days: core.dso_days,
            dscr: core.dscr,
            risk_score,
            creditworthiness,
            benchmarks,
            flags,
            forecast,
            anomalies,
            scenarios,
            default_probability,
            credit_risk_factors,
        })
    }
}

impl Default for HealthAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
