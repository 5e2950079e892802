//! Human-readable recommendations derived from a completed report.
//!
//! Ordered rule list: the most actionable operational fixes first, credit
//! guidance after, trend commentary last. Output is capped so the response
//! stays digestible.

use super::types::HealthReport;

/// Upper bound on returned recommendations.
const MAX_RECOMMENDATIONS: usize = 8;

/// Default probability (%) above which debt reduction takes priority.
const HIGH_DEFAULT_PROBABILITY: f64 = 30.0;

/// Forecast growth (%) considered noteworthy either direction.
const NOTABLE_GROWTH_PCT: f64 = 10.0;

/// Build the recommendation list for a report.
pub fn build_recommendations(report: &HealthReport) -> Vec<String> {
    let mut recs = Vec::new();

    // Profitability
    if report.net_margin < report.benchmarks.net_margin {
        recs.push("Review COGS and vendor contracts; negotiate bulk discounts.".to_string());
    }

    // Liquidity
    if report.current_ratio < report.benchmarks.current_ratio {
        recs.push(
            "Improve liquidity by tightening credit terms and accelerating collections."
                .to_string(),
        );
    }

    // Receivables
    if report.dso_days > report.benchmarks.dso_days {
        recs.push("Introduce early payment incentives and automate invoice reminders.".to_string());
    }

    // Debt service
    if report.dscr < 1.2 {
        recs.push("Consider restructuring high-interest debt to improve cash flow.".to_string());
    }

    // Credit risk
    if report.default_probability > HIGH_DEFAULT_PROBABILITY {
        recs.push(
            "High credit risk detected - focus on debt reduction and cash reserve building."
                .to_string(),
        );
    }

    // Outliers
    if !report.anomalies.is_empty() {
        recs.push(
            "Unusual patterns detected in financial data - conduct detailed audit.".to_string(),
        );
    }

    // Downside scenario
    if report.scenarios.pessimistic.net_margin < 0.0 {
        recs.push(
            "Prepare contingency plans; pessimistic scenario shows negative margins.".to_string(),
        );
    }

    // Credit positioning
    if report.is_credit_eligible() {
        recs.push("Eligible for working capital lines or invoice discounting products.".to_string());
    } else {
        recs.push("Focus on profitability and cashflow stabilization before new credit.".to_string());
    }

    // Trend commentary
    if let Some(last) = report.forecast.revenue.last() {
        let projected_growth = (last - report.revenue) / report.revenue.max(1.0) * 100.0;
        if projected_growth > NOTABLE_GROWTH_PCT {
            recs.push(format!(
                "Revenue growth trend detected (~{:.1}% over forecast period).",
                projected_growth
            ));
        } else if projected_growth < -NOTABLE_GROWTH_PCT {
            recs.push(format!(
                "Revenue decline trend detected (~{:.1}%) - cost optimization urgent.",
                projected_growth
            ));
        }
    }

    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}

// ============================================================================
// Tests
// ============================================================================
