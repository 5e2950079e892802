//! Scenario deltas around the observed aggregates.
//!
//! Shocks the total revenue/expense figures rather than the row data: the
//! point is a quick sensitivity read, not a second forecast.

use super::metrics::CoreMetrics;
use super::types::{BaseScenario, ScenarioOutcome, ScenarioSet};

/// Revenue decline assumed in the pessimistic case.
const PESSIMISTIC_REVENUE: f64 = 0.85;
/// Expense growth assumed in the pessimistic case.
const PESSIMISTIC_EXPENSES: f64 = 1.10;
/// Revenue growth assumed in the optimistic case.
const OPTIMISTIC_REVENUE: f64 = 1.20;
/// Expense reduction assumed in the optimistic case.
const OPTIMISTIC_EXPENSES: f64 = 0.95;

/// Build the pessimistic / base / optimistic scenario set.
pub fn build_scenarios(metrics: &CoreMetrics) -> ScenarioSet {
    ScenarioSet {
        pessimistic: project(
            metrics.revenue * PESSIMISTIC_REVENUE,
            metrics.expenses * PESSIMISTIC_EXPENSES,
        ),
        base: BaseScenario {
            revenue: metrics.revenue,
            expenses: metrics.expenses,
            net_margin: metrics.net_margin,
            description: "Current trajectory based on historical data".to_string(),
        },
        optimistic: project(
            metrics.revenue * OPTIMISTIC_REVENUE,
            metrics.expenses * OPTIMISTIC_EXPENSES,
        ),
    }
}

fn project(revenue: f64, expenses: f64) -> ScenarioOutcome {
    let net_income = revenue - expenses;
    let net_margin = if revenue > 0.0 {
        net_income / revenue
    } else {
        0.0
    };

    ScenarioOutcome {
        revenue: revenue.max(0.0),
        expenses: expenses.max(0.0),
        net_income,
        net_margin,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(revenue: f64, expenses: f64) -> CoreMetrics {
        let net_income = revenue - expenses;
        CoreMetrics {
            revenue,
            expenses,
            net_income,
            net_margin: if revenue != 0.0 { net_income / revenue } else { 0.0 },
            net_cashflow: net_income,
            ar: 0.0,
            current_ratio: 2.0,
            dso_days: 0.0,
            dscr: 2.0,
        }
    }

    #[test]
    fn test_scenario_multipliers() {
        let set = build_scenarios(&metrics(1000.0, 800.0));

        assert!((set.pessimistic.revenue - 850.0).abs() < 1e-9);
        assert!((set.pessimistic.expenses - 880.0).abs() < 1e-9);
        assert!((set.pessimistic.net_income - (-30.0)).abs() < 1e-9);

        assert!((set.optimistic.revenue - 1200.0).abs() < 1e-9);
        assert!((set.optimistic.expenses - 760.0).abs() < 1e-9);
        assert!(set.optimistic.net_margin > set.pessimistic.net_margin);
    }

    #[test]
    fn test_base_reports_observed_figures() {
        let set = build_scenarios(&metrics(1000.0, 800.0));
        assert_eq!(set.base.revenue, 1000.0);
        assert!((set.base.net_margin - 0.2).abs() < 1e-9);
        assert!(set.base.description.contains("historical"));
    }

    #[test]
    fn test_thin_margin_goes_negative_in_pessimistic_case() {
        // 5% margin flips negative under the pessimistic shock
        let set = build_scenarios(&metrics(1000.0, 950.0));
        assert!(set.pessimistic.net_margin < 0.0);
        assert!(set.base.net_margin > 0.0);
    }

    #[test]
    fn test_zero_revenue_does_not_divide() {
        let set = build_scenarios(&metrics(0.0, 100.0));
        assert_eq!(set.pessimistic.revenue, 0.0);
        assert_eq!(set.pessimistic.net_margin, 0.0);
    }
}
