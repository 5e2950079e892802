//! Straight-line trend extrapolation.
//!
//! Fits revenue and expenses against the period index with ordinary least
//! squares and extends both lines past the observed data. The fit is redone
//! from scratch on every request; there is no model to persist.

use crate::ingest::RecordTable;
use super::types::TrendForecast;

/// Fitted line in period-index space.
#[derive(Debug, Clone, Copy)]
struct TrendLine {
    slope: f64,
    intercept: f64,
}

impl TrendLine {
    fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Per-request trend forecaster.
pub struct TrendForecaster {
    periods: usize,
}

impl TrendForecaster {
    /// Forecast the given number of periods past the end of the data.
    pub fn new(periods: usize) -> Self {
        Self { periods }
    }

    /// Extrapolate revenue, expenses, and the implied net margin.
    ///
    /// Both series need at least two usable points; otherwise the forecast
    /// is empty and callers skip trend-based reasoning.
    pub fn forecast(&self, table: &RecordTable) -> TrendForecast {
        let revenue_line = fit_line(&table.numeric_points("revenue"));
        let expense_line = fit_line(&table.numeric_points("expenses"));

        let (Some(revenue_line), Some(expense_line)) = (revenue_line, expense_line) else {
            return TrendForecast::default();
        };

        let start = table.rows();
        let mut revenue = Vec::with_capacity(self.periods);
        let mut expenses = Vec::with_capacity(self.periods);
        let mut net_margin = Vec::with_capacity(self.periods);

        for offset in 0..self.periods {
            let x = (start + offset) as f64;
            // Projections below zero are not meaningful for either series
            let r = revenue_line.at(x).max(0.0);
            let e = expense_line.at(x).max(0.0);
            revenue.push(r);
            expenses.push(e);
            net_margin.push(if r > 0.0 { (r - e) / r } else { 0.0 });
        }

        TrendForecast {
            revenue,
            expenses,
            net_margin,
        }
    }
}

/// Ordinary least squares fit over (row index, value) points.
/// Returns `None` when fewer than two points are available.
fn fit_line(points: &[(usize, f64)]) -> Option<TrendLine> {
    let n = points.len() as f64;
    if points.len() < 2 {
        return None;
    }

    let x_mean = points.iter().map(|(x, _)| *x as f64).sum::<f64>() / n;
    let y_mean = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (x, y) in points {
        let dx = *x as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }

    if den.abs() < 1e-12 {
        return None;
    }

    let slope = num / den;
    Some(TrendLine {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn table(revenue: &[f64], expenses: &[f64]) -> RecordTable {
        let headers = vec!["revenue".to_string(), "expenses".to_string()];
        let rows: Vec<Vec<Option<f64>>> = revenue
            .iter()
            .zip(expenses)
            .map(|(r, e)| vec![Some(*r), Some(*e)])
            .collect();
        RecordTable::from_rows(&headers, &rows)
    }

    #[test]
    fn test_linear_growth_extrapolates_forward() {
        // revenue 100, 110, 120, 130 -> next should continue at +10
        let t = table(&[100.0, 110.0, 120.0, 130.0], &[50.0, 55.0, 60.0, 65.0]);
        let forecast = TrendForecaster::new(3).forecast(&t);

        assert_eq!(forecast.revenue.len(), 3);
        assert!((forecast.revenue[0] - 140.0).abs() < 1e-6);
        assert!((forecast.revenue[2] - 160.0).abs() < 1e-6);
        assert!((forecast.expenses[0] - 70.0).abs() < 1e-6);
        // margin of the projected periods stays at 50%
        assert!((forecast.net_margin[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_declining_revenue_clamped_at_zero() {
        let t = table(&[60.0, 40.0, 20.0], &[10.0, 10.0, 10.0]);
        let forecast = TrendForecaster::new(3).forecast(&t);

        // 0, then clamped below zero
        assert!((forecast.revenue[0] - 0.0).abs() < 1e-6);
        assert_eq!(forecast.revenue[2], 0.0);
        // zero revenue periods report zero margin
        assert_eq!(forecast.net_margin[2], 0.0);
    }

    #[test]
    fn test_too_little_history_gives_empty_forecast() {
        let t = table(&[100.0], &[50.0]);
        let forecast = TrendForecaster::new(3).forecast(&t);
        assert!(forecast.is_empty());
        assert!(forecast.expenses.is_empty());
    }

    #[test]
    fn test_flat_series_forecasts_flat() {
        let t = table(&[100.0, 100.0, 100.0], &[80.0, 80.0, 80.0]);
        let forecast = TrendForecaster::new(2).forecast(&t);
        assert!((forecast.revenue[1] - 100.0).abs() < 1e-6);
        assert!((forecast.net_margin[0] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_gap_rows_are_skipped_not_zeroed() {
        let headers = vec!["revenue".to_string(), "expenses".to_string()];
        let rows = vec![
            vec![Some(100.0), Some(50.0)],
            vec![None, Some(55.0)],
            vec![Some(120.0), Some(60.0)],
        ];
        let t = RecordTable::from_rows(&headers, &rows);
        let forecast = TrendForecaster::new(1).forecast(&t);
        // fit over rows 0 and 2: slope 10/unit, next index is 3 -> 130
        assert!((forecast.revenue[0] - 130.0).abs() < 1e-6);
    }
}
