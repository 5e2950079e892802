//! Financial health assessment types.
//!
//! Defines the wire types for the assessment pipeline: core ratios, the
//! credit tier, industry benchmarks, and the statistical extras (forecast,
//! outlier flags, scenarios, default probability).

use serde::{Deserialize, Serialize};

// ============================================================================
// Industry Benchmarks
// ============================================================================

/// Supported industry profiles for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Industry {
    Manufacturing,
    Retail,
    Agriculture,
    Services,
    Logistics,
    Ecommerce,
}

impl Industry {
    /// Parse a caller-supplied industry name. Matching is case-insensitive;
    /// unknown names return `None` (callers fall back to Services).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "manufacturing" => Some(Self::Manufacturing),
            "retail" => Some(Self::Retail),
            "agriculture" => Some(Self::Agriculture),
            "services" => Some(Self::Services),
            "logistics" => Some(Self::Logistics),
            "e-commerce" | "ecommerce" => Some(Self::Ecommerce),
            _ => None,
        }
    }

    /// Reference benchmarks for this industry.
    pub fn benchmarks(&self) -> IndustryBenchmarks {
        match self {
            Self::Manufacturing => IndustryBenchmarks::new(0.08, 1.5, 45.0),
            Self::Retail => IndustryBenchmarks::new(0.05, 1.3, 25.0),
            Self::Agriculture => IndustryBenchmarks::new(0.06, 1.2, 60.0),
            Self::Services => IndustryBenchmarks::new(0.12, 1.6, 35.0),
            Self::Logistics => IndustryBenchmarks::new(0.04, 1.4, 40.0),
            Self::Ecommerce => IndustryBenchmarks::new(0.03, 1.2, 30.0),
        }
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manufacturing => write!(f, "Manufacturing"),
            Self::Retail => write!(f, "Retail"),
            Self::Agriculture => write!(f, "Agriculture"),
            Self::Services => write!(f, "Services"),
            Self::Logistics => write!(f, "Logistics"),
            Self::Ecommerce => write!(f, "E-commerce"),
        }
    }
}

/// Reference ratios a healthy business in the industry is expected to meet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndustryBenchmarks {
    /// Expected net margin (fraction of revenue)
    pub net_margin: f64,
    /// Expected current ratio
    pub current_ratio: f64,
    /// Expected days sales outstanding
    pub dso_days: f64,
}

impl IndustryBenchmarks {
    pub const fn new(net_margin: f64, current_ratio: f64, dso_days: f64) -> Self {
        Self {
            net_margin,
            current_ratio,
            dso_days,
        }
    }
}

// ============================================================================
// Credit Tier
// ============================================================================

/// Creditworthiness tier derived from the composite risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditTier {
    Excellent,
    Good,
    Fair,
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl CreditTier {
    /// Classify a 0-100 risk score (higher is healthier).
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 65.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Fair
        } else {
            Self::HighRisk
        }
    }
}

impl std::fmt::Display for CreditTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "Excellent"),
            Self::Good => write!(f, "Good"),
            Self::Fair => write!(f, "Fair"),
            Self::HighRisk => write!(f, "High Risk"),
        }
    }
}

// ============================================================================
// Statistical Extras
// ============================================================================

/// Straight-line trend forecast for the next few periods.
///
/// Empty vectors mean the input had too little history to fit a line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendForecast {
    pub revenue: Vec<f64>,
    pub expenses: Vec<f64>,
    pub net_margin: Vec<f64>,
}

impl TrendForecast {
    pub fn is_empty(&self) -> bool {
        self.revenue.is_empty()
    }
}

/// Projected metrics under a shocked revenue/expense assumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub revenue: f64,
    pub expenses: f64,
    pub net_income: f64,
    pub net_margin: f64,
}

/// The as-is scenario, kept separate because it reports observed figures
/// rather than projections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseScenario {
    pub revenue: f64,
    pub expenses: f64,
    pub net_margin: f64,
    pub description: String,
}

/// Pessimistic / base / optimistic scenario set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub pessimistic: ScenarioOutcome,
    pub base: BaseScenario,
    pub optimistic: ScenarioOutcome,
}

// ============================================================================
// Health Report
// ============================================================================

/// Complete assessment of one uploaded record set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Caller-supplied industry label (echoed verbatim)
    pub industry: String,

    // === Core metrics ===
    /// Total revenue across all periods
    pub revenue: f64,
    /// Total expenses across all periods
    pub expenses: f64,
    pub net_income: f64,
    pub net_margin: f64,
    pub net_cashflow: f64,
    pub current_ratio: f64,
    /// Days sales outstanding
    pub dso_days: f64,
    /// Debt service coverage ratio
    pub dscr: f64,

    // === Scoring ===
    /// Composite risk score (0-100, higher is healthier)
    pub risk_score: f64,
    pub creditworthiness: CreditTier,
    /// Benchmarks the metrics were compared against
    pub benchmarks: IndustryBenchmarks,
    /// Benchmark breaches, in evaluation order
    pub flags: Vec<String>,

    // === Statistical extras ===
    pub forecast: TrendForecast,
    /// Outlier flags, one per anomalous period
    pub anomalies: Vec<String>,
    pub scenarios: ScenarioSet,
    /// Estimated default probability (0-100%)
    pub default_probability: f64,
    pub credit_risk_factors: Vec<String>,
}

impl HealthReport {
    /// Whether the score clears the bar for new credit products.
    pub fn is_credit_eligible(&self) -> bool {
        self.risk_score >= 65.0
    }
}

// ============================================================================
// Tests
// ============================================================================
