//! Configuration management for the FinHealth service.
//!
//! Configuration lives in a single JSON file at `~/.finhealth/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (FINHEALTH_* prefix, plus `API_KEY`)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `FINHEALTH_HOST` → server.host
//! - `FINHEALTH_PORT` → server.port
//! - `FINHEALTH_API_KEY` / `API_KEY` → auth.api_key
//! - `FINHEALTH_LOG_LEVEL` → observability.log_level
//! - `FINHEALTH_LOG_FORMAT` → observability.log_format
//! - `FINHEALTH_DB_PATH` → storage.db_path
//! - `FINHEALTH_STORAGE_ENABLED` → storage.enabled

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".finhealth"),
        |dirs| dirs.home_dir().join(".finhealth"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Server Configuration
// ============================================================================

/// HTTP server bind configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address. Default: "127.0.0.1" (local only).
    /// Set to "0.0.0.0" for remote access.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port number for the service
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8000
}

// ============================================================================
// Auth Configuration
// ============================================================================

/// API key authentication.
///
/// When `api_key` is set and non-empty, every route except `/health`
/// requires a matching `X-API-Key` header.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Shared API key. `None` or empty disables auth entirely.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl AuthConfig {
    /// Returns the configured key if auth is enabled.
    pub fn required_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

// ============================================================================
// CORS Configuration
// ============================================================================

/// CORS allowed origins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins for browser clients.
    #[serde(default = "default_cors_origins")]
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_cors_origins(),
        }
    }
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".into(),
        "http://127.0.0.1:5173".into(),
    ]
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format: "json" for structured JSON, "pretty" for human-readable
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Storage Configuration
// ============================================================================

/// Assessment persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Whether assessments are persisted at all
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            enabled: true,
        }
    }
}

fn default_db_path() -> PathBuf {
    config_dir().join("assessments.db")
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Analysis Configuration
// ============================================================================

/// Tunables for the analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of periods to extrapolate in the trend forecast
    #[serde(default = "default_forecast_periods")]
    pub forecast_periods: usize,

    /// Absolute z-score at which a period is flagged as an outlier
    #[serde(default = "default_outlier_threshold")]
    pub outlier_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            forecast_periods: default_forecast_periods(),
            outlier_threshold: default_outlier_threshold(),
        }
    }
}

fn default_forecast_periods() -> usize {
    3
}

fn default_outlier_threshold() -> f64 {
    2.5
}

// ============================================================================
// Top-level Configuration
// ============================================================================

/// Unified FinHealth configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when no config file exists. Environment overrides are always applied.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply FINHEALTH_* environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("FINHEALTH_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parse::<u16>("FINHEALTH_PORT") {
            self.server.port = port;
        }
        if let Ok(key) = std::env::var("FINHEALTH_API_KEY").or_else(|_| std::env::var("API_KEY")) {
            self.auth.api_key = Some(key);
        }
        if let Ok(level) = std::env::var("FINHEALTH_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("FINHEALTH_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Ok(path) = std::env::var("FINHEALTH_DB_PATH") {
            self.storage.db_path = PathBuf::from(path);
        }
        if let Some(enabled) = env_parse::<bool>("FINHEALTH_STORAGE_ENABLED") {
            self.storage.enabled = enabled;
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert!(config.auth.api_key.is_none());
        assert_eq!(config.observability.log_level, "info");
        assert!(config.storage.enabled);
        assert_eq!(config.analysis.forecast_periods, 3);
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"server": {"port": 9000}}"#).expect("parse partial config");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.cors.origins.len(), 2);
    }

    #[test]
    fn test_required_key_ignores_empty() {
        let auth = AuthConfig {
            api_key: Some(String::new()),
        };
        assert!(auth.required_key().is_none());

        let auth = AuthConfig {
            api_key: Some("dev-key".into()),
        };
        assert_eq!(auth.required_key(), Some("dev-key"));
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(dir.path().join("nope.json")).expect("load");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"auth": {"api_key": "secret"}, "storage": {"enabled": false}}"#,
        )
        .expect("write config");

        let config = Config::load_from(path).expect("load");
        assert!(!config.storage.enabled);
        // May be overridden by API_KEY in the environment; only assert when unset
        if std::env::var("API_KEY").is_err() && std::env::var("FINHEALTH_API_KEY").is_err() {
            assert_eq!(config.auth.api_key.as_deref(), Some("secret"));
        }
    }
}
