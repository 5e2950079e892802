//! Outlier screening over reporting periods.
//!
//! Each period is reduced to four features (revenue, expenses, net cashflow,
//! net margin); features are standardized over the request's rows and a
//! period is flagged when any standardized value strays past the threshold.
//! The screen is refit from scratch per request, like the trend fit.

use statrs::statistics::Statistics;

use crate::ingest::RecordTable;

/// Minimum periods for the standardization to mean anything.
const MIN_ROWS: usize = 3;

/// Guard against division blowups on zero-revenue periods.
const MARGIN_EPSILON: f64 = 1e-9;

/// Z-score based outlier detector.
pub struct OutlierDetector {
    threshold: f64,
}

impl OutlierDetector {
    /// Flag periods whose standardized features reach `threshold`.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Detect anomalous periods, returning one human-readable flag per hit.
    ///
    /// Degenerate inputs (too few rows, zero-variance features) contribute
    /// no flags; a near-empty upload must not read as "everything is
    /// unusual".
    pub fn detect(&self, table: &RecordTable) -> Vec<String> {
        let rows = table.rows();
        if rows < MIN_ROWS {
            return Vec::new();
        }

        let features = extract_features(table);
        let mut flagged = vec![false; rows];

        for values in &features {
            let mean = values.iter().mean();
            let std_dev = values.iter().population_std_dev();
            if !std_dev.is_finite() || std_dev <= MARGIN_EPSILON {
                continue;
            }

            for (row, value) in values.iter().enumerate() {
                let z = (value - mean) / std_dev;
                if z.abs() >= self.threshold {
                    flagged[row] = true;
                }
            }
        }

        flagged
            .iter()
            .enumerate()
            .filter(|(_, hit)| **hit)
            .map(|(row, _)| format!("Unusual pattern detected in period {}", row + 1))
            .collect()
    }
}

/// Per-period feature columns: revenue, expenses, net cashflow, net margin.
/// Cash columns fall back to revenue/expenses; empty cells contribute 0.
fn extract_features(table: &RecordTable) -> [Vec<f64>; 4] {
    let rows = table.rows();
    let mut revenue = Vec::with_capacity(rows);
    let mut expenses = Vec::with_capacity(rows);
    let mut cashflow = Vec::with_capacity(rows);
    let mut margin = Vec::with_capacity(rows);

    let cash_in_col = if table.has_column("cash_in") {
        "cash_in"
    } else {
        "revenue"
    };
    let cash_out_col = if table.has_column("cash_out") {
        "cash_out"
    } else {
        "expenses"
    };

    for row in 0..rows {
        let rev = table.value_at("revenue", row).unwrap_or(0.0);
        let exp = table.value_at("expenses", row).unwrap_or(0.0);
        let cin = table.value_at(cash_in_col, row).unwrap_or(0.0);
        let cout = table.value_at(cash_out_col, row).unwrap_or(0.0);

        revenue.push(rev);
        expenses.push(exp);
        cashflow.push(cin - cout);
        margin.push((rev - exp) / (rev + MARGIN_EPSILON));
    }

    [revenue, expenses, cashflow, margin]
}

// ============================================================================
// Tests
// ============================================================================
