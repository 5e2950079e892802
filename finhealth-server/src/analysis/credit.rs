//! Default-probability heuristic and credit risk factors.
//!
//! A weighted composite of margin, liquidity, and coverage, inverted into a
//! rough probability of default. Deliberately simple: the inputs are a
//! handful of ratios from one upload, not a loan book.

use super::metrics::{round2, CoreMetrics};

/// Component weights: liquidity dominates, margin and coverage split the rest.
const MARGIN_WEIGHT: f64 = 0.3;
const LIQUIDITY_WEIGHT: f64 = 0.4;
const DSCR_WEIGHT: f64 = 0.3;

/// Estimate the probability of default (0-100%).
///
/// Each ratio is normalized onto a 0-1 scale over its plausible range, the
/// weighted blend is inverted (healthy ratios mean low default risk), and
/// the result is clamped to a percentage.
pub fn default_probability(metrics: &CoreMetrics) -> f64 {
    // Margin scale: -10% maps to 0, +15% maps to 1
    let margin_score = ((metrics.net_margin + 0.1) / 0.25).clamp(0.0, 1.0);
    // Current ratio scale: 0 to 2
    let liquidity_score = (metrics.current_ratio / 2.0).clamp(0.0, 1.0);
    // DSCR scale: 0 to 2.5
    let dscr_score = (metrics.dscr / 2.5).clamp(0.0, 1.0);

    let composite = 1.0
        - (margin_score * MARGIN_WEIGHT
            + liquidity_score * LIQUIDITY_WEIGHT
            + dscr_score * DSCR_WEIGHT);

    round2((composite * 100.0).clamp(0.0, 100.0))
}

/// Name the specific ratios driving credit risk, in severity order.
pub fn risk_factors(metrics: &CoreMetrics) -> Vec<String> {
    let mut factors = Vec::new();

    if metrics.net_margin < 0.05 {
        factors.push("Low profitability margins (< 5%)".to_string());
    }
    if metrics.current_ratio < 1.0 {
        factors.push("Liquidity crisis risk (current ratio < 1.0)".to_string());
    }
    if metrics.dso_days > 90.0 {
        factors.push("Extended payment collection period (>90 days)".to_string());
    }
    if metrics.dscr < 1.0 {
        factors.push("Cannot cover debt service from operating cash flow".to_string());
    }

    if factors.is_empty() {
        factors.push("No major credit risk factors identified".to_string());
    }

    factors
}

// ============================================================================
// Tests
// ============================================================================
