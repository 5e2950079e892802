//! Assessment persistence using SQLite.
//!
//! Every completed analysis is recorded with its headline figures and the
//! full report JSON. Persistence is best-effort: a write failure is logged
//! and the request still succeeds.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use finhealth_common::config::StorageConfig;

use crate::analysis::types::HealthReport;

// ============================================================================
// Database Schema
// ============================================================================

const CREATE_TABLES_SQL: &str = r#"
-- One row per completed analysis
CREATE TABLE IF NOT EXISTS assessments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    industry TEXT NOT NULL,
    revenue REAL,
    expenses REAL,
    net_margin REAL,
    risk_score REAL,
    creditworthiness TEXT,
    details TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_assessments_created_at
ON assessments(created_at DESC);
"#;

// ============================================================================
// Assessment Store
// ============================================================================

/// Headline row returned by the recent-assessments listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub id: i64,
    pub industry: String,
    pub revenue: f64,
    pub expenses: f64,
    pub net_margin: f64,
    pub risk_score: f64,
    pub creditworthiness: String,
    pub created_at: String,
}

/// SQLite-backed assessment store.
pub struct AssessmentStore {
    /// SQLite connection wrapped in Mutex for thread safety
    /// (rusqlite::Connection is Send but not Sync)
    db: Mutex<Connection>,
}

impl AssessmentStore {
    /// Open (or create) the store at the configured path.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&config.db_path)
            .context("Failed to open assessment database")?;

        // WAL for concurrent readers while a request is writing
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .context("Failed to set database pragmas")?;

        conn.execute_batch(CREATE_TABLES_SQL)
            .context("Failed to create database tables")?;

        info!(db_path = %config.db_path.display(), "Initialized assessment store");

        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        conn.execute_batch(CREATE_TABLES_SQL)
            .context("Failed to create database tables")?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Persist a completed report. Returns the assessment row id.
    pub async fn save_assessment(&self, report: &HealthReport) -> Result<i64> {
        let details =
            serde_json::to_string(report).context("Failed to serialize assessment report")?;
        let created_at = Utc::now().to_rfc3339();

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO assessments
             (industry, revenue, expenses, net_margin, risk_score, creditworthiness, details, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                report.industry,
                report.revenue,
                report.expenses,
                report.net_margin,
                report.risk_score,
                report.creditworthiness.to_string(),
                details,
                created_at,
            ],
        )
        .context("Failed to insert assessment")?;

        Ok(db.last_insert_rowid())
    }

    /// Most recent assessments, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<AssessmentSummary>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, industry, revenue, expenses, net_margin, risk_score, creditworthiness, created_at
             FROM assessments
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(AssessmentSummary {
                id: row.get(0)?,
                industry: row.get(1)?,
                revenue: row.get(2)?,
                expenses: row.get(3)?,
                net_margin: row.get(4)?,
                risk_score: row.get(5)?,
                creditworthiness: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?;

        Ok(rows.filter_map(|r| r.ok()).collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
