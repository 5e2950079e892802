//! Record table ingestion.
//!
//! Uploaded files and JSON payloads are reduced to a [`RecordTable`]: a small
//! column-oriented table of optional numeric cells, one row per reporting
//! period. Heterogeneous bookkeeping exports name the same concepts
//! differently ("Sales", "turnover", "Operating Expenses"), so headers are
//! canonicalized and mapped through an alias table before analysis.

use std::collections::BTreeMap;

use finhealth_common::error::{Error, Result};

mod upload;

pub use upload::parse_upload;

/// Column aliases, applied in order. A source column is copied to its
/// canonical target only when the target is not already present, so an
/// explicit `revenue` column always wins over `sales`.
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("sales", "revenue"),
    ("income", "revenue"),
    ("turnover", "revenue"),
    ("cost", "expenses"),
    ("expense", "expenses"),
    ("operating_expenses", "expenses"),
    ("accounts_receivable", "ar"),
    ("receivables", "ar"),
    ("accounts_payable", "ap"),
    ("payables", "ap"),
    ("inventory_level", "inventory"),
    ("loan_obligations", "debt"),
    ("tax_deductions", "tax"),
];

/// Canonicalize a raw header: trim, lowercase, spaces to underscores.
fn canonical_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Parse a raw cell into a numeric value. Blank and non-numeric cells
/// become empty cells rather than errors.
fn parse_cell(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ============================================================================
// Record Table
// ============================================================================

/// A small in-memory table of financial records.
///
/// Columns are keyed by canonical name; every column is padded to the common
/// row count, with unparseable cells stored as `None`. Aggregations skip
/// empty cells, mirroring how spreadsheet tools treat blanks.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    columns: BTreeMap<String, Vec<Option<f64>>>,
    rows: usize,
}

impl RecordTable {
    /// Build a table from raw headers and row-major cells.
    ///
    /// Headers are canonicalized; on duplicate canonical names the first
    /// column wins. Short rows are padded with empty cells.
    pub fn from_rows(headers: &[String], rows: &[Vec<Option<f64>>]) -> Self {
        let mut columns: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
        let names: Vec<String> = headers.iter().map(|h| canonical_name(h)).collect();

        for (idx, name) in names.iter().enumerate() {
            if name.is_empty() || columns.contains_key(name) {
                continue;
            }
            let values = rows
                .iter()
                .map(|row| row.get(idx).copied().flatten())
                .collect();
            columns.insert(name.clone(), values);
        }

        let mut table = Self {
            columns,
            rows: rows.len(),
        };
        table.apply_aliases();
        table
    }

    /// Build a table from JSON records (one object per period).
    ///
    /// Numeric values and numeric-looking strings become cells; anything
    /// else is an empty cell. Non-object entries are skipped.
    pub fn from_json_records(records: &[serde_json::Value]) -> Self {
        let objects: Vec<&serde_json::Map<String, serde_json::Value>> =
            records.iter().filter_map(|r| r.as_object()).collect();

        // Union of keys across all records, canonicalized
        let mut headers: Vec<String> = Vec::new();
        for obj in &objects {
            for key in obj.keys() {
                let name = canonical_name(key);
                if !name.is_empty() && !headers.contains(&name) {
                    headers.push(name);
                }
            }
        }

        let rows: Vec<Vec<Option<f64>>> = objects
            .iter()
            .map(|obj| {
                headers
                    .iter()
                    .map(|name| {
                        obj.iter()
                            .find(|(key, _)| canonical_name(key) == *name)
                            .and_then(|(_, value)| json_cell(value))
                    })
                    .collect()
            })
            .collect();

        Self::from_rows(&headers, &rows)
    }

    /// Copy aliased source columns onto their canonical names.
    fn apply_aliases(&mut self) {
        for (src, target) in COLUMN_ALIASES {
            if self.columns.contains_key(*src) && !self.columns.contains_key(*target) {
                let values = self.columns[*src].clone();
                self.columns.insert((*target).to_string(), values);
            }
        }
    }

    /// Number of rows (reporting periods).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Whether a canonical column is present.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Cell value at a given row, `None` when the column is absent or the
    /// cell is empty.
    pub fn value_at(&self, name: &str, row: usize) -> Option<f64> {
        self.columns.get(name)?.get(row).copied().flatten()
    }

    /// Sum of a column's present cells; 0.0 when the column is absent.
    pub fn column_sum(&self, name: &str) -> f64 {
        self.columns
            .get(name)
            .map(|values| values.iter().flatten().sum())
            .unwrap_or(0.0)
    }

    /// Sum of `name`, falling back to `fallback` when `name` is absent.
    pub fn column_sum_or(&self, name: &str, fallback: &str) -> f64 {
        if self.has_column(name) {
            self.column_sum(name)
        } else {
            self.column_sum(fallback)
        }
    }

    /// Mean over a column's present cells; 0.0 when the column is absent or
    /// contains no parseable values.
    pub fn column_mean(&self, name: &str) -> f64 {
        let Some(values) = self.columns.get(name) else {
            return 0.0;
        };
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return 0.0;
        }
        present.iter().sum::<f64>() / present.len() as f64
    }

    /// Present cells of a column paired with their row index, in row order.
    /// Used by the trend fit, where the row index is the regressor.
    pub fn numeric_points(&self, name: &str) -> Vec<(usize, f64)> {
        self.columns
            .get(name)
            .map(|values| {
                values
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, cell)| cell.map(|v| (idx, v)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ensure the listed columns exist, returning the missing ones otherwise.
    pub fn require_columns(&self, required: &[&str]) -> Result<()> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !self.has_column(name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

fn json_cell(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => parse_cell(s),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
