// ==========================================
// Academic Records Core - Configuration
// ==========================================
// Deployment-level settings for the embedding application.
// Business rules are never configuration; they live in the engines.
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database file path. Defaults to a per-user data directory.
    pub db_path: String,
    /// Per-connection busy_timeout in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: crate::db::DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file, falling back to defaults for
    /// missing fields.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }
}

/// Default database location: `<data_dir>/academic-records/records.db`,
/// falling back to the working directory when no data dir is available.
pub fn default_db_path() -> String {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("academic-records")
        .join("records.db")
        .to_string_lossy()
        .to_string()
}
