//! Core ratio derivation and risk scoring.
//!
//! Works from whatever columns the upload actually carried: cash flow falls
//! back to revenue/expenses, and balance-sheet columns default to zero, so a
//! bare profit-and-loss export still produces a usable (if coarse) score.

use finhealth_common::error::Result;

use crate::ingest::RecordTable;
use super::types::IndustryBenchmarks;

/// Columns an upload must carry to be analyzable at all.
pub const REQUIRED_FIELDS: &[&str] = &["revenue", "expenses"];

/// DSCR below this is flagged as weak coverage regardless of industry.
const WEAK_DSCR: f64 = 1.2;

/// Aggregate ratios derived from the record table.
#[derive(Debug, Clone)]
pub struct CoreMetrics {
    pub revenue: f64,
    pub expenses: f64,
    pub net_income: f64,
    pub net_margin: f64,
    pub net_cashflow: f64,
    /// Mean accounts receivable per period
    pub ar: f64,
    pub current_ratio: f64,
    pub dso_days: f64,
    pub dscr: f64,
}

/// Derive the core metrics from a record table.
///
/// Fails only when the required columns are missing; every other gap is
/// covered by a documented fallback.
pub fn compute_core_metrics(table: &RecordTable) -> Result<CoreMetrics> {
    table.require_columns(REQUIRED_FIELDS)?;

    let revenue = table.column_sum("revenue");
    let expenses = table.column_sum("expenses");
    let net_income = revenue - expenses;
    let net_margin = if revenue != 0.0 {
        net_income / revenue
    } else {
        0.0
    };

    let cash_in = table.column_sum_or("cash_in", "revenue");
    let cash_out = table.column_sum_or("cash_out", "expenses");
    let net_cashflow = cash_in - cash_out;

    let ar = table.column_mean("ar");
    let ap = table.column_mean("ap");
    let inventory = table.column_mean("inventory");

    let current_assets = ar + inventory + net_cashflow.max(0.0);
    let current_liabilities = ap + table.column_mean("debt");
    // With no liabilities on record, assume comfortable liquidity
    let current_ratio = if current_liabilities != 0.0 {
        current_assets / current_liabilities
    } else {
        2.0
    };

    let dso_days = if revenue != 0.0 {
        (ar / revenue) * 365.0
    } else {
        0.0
    };

    let debt = table.column_sum("debt");
    // No recorded debt: treat coverage as comfortable rather than infinite
    let dscr = if debt != 0.0 { net_cashflow / debt } else { 2.0 };

    Ok(CoreMetrics {
        revenue,
        expenses,
        net_income,
        net_margin,
        net_cashflow,
        ar,
        current_ratio,
        dso_days,
        dscr,
    })
}

/// Composite risk score (0-100, higher is healthier).
///
/// Four equally weighted components: margin, liquidity, collection speed,
/// and debt service coverage, each saturating at a "healthy enough" level.
pub fn risk_score(metrics: &CoreMetrics) -> f64 {
    let margin_score = clamp_unit(metrics.net_margin / 0.15);
    let liquidity_score = clamp_unit((metrics.current_ratio - 1.0) / 1.5);
    let dso_score = clamp_unit(1.0 - metrics.dso_days / 120.0);
    let dscr_score = clamp_unit(metrics.dscr / 2.0);

    round2((margin_score + liquidity_score + dso_score + dscr_score) * 25.0)
}

/// Benchmark breaches, in evaluation order.
pub fn benchmark_flags(metrics: &CoreMetrics, benchmarks: &IndustryBenchmarks) -> Vec<String> {
    let mut flags = Vec::new();

    if metrics.net_margin < benchmarks.net_margin {
        flags.push("Net margin below industry benchmark".to_string());
    }
    if metrics.current_ratio < benchmarks.current_ratio {
        flags.push("Liquidity below benchmark".to_string());
    }
    if metrics.dso_days > benchmarks.dso_days {
        flags.push("Receivables days higher than benchmark".to_string());
    }
    if metrics.dscr < WEAK_DSCR {
        flags.push("Debt service coverage weak".to_string());
    }

    flags
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Tests
// ============================================================================
