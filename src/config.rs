//! Application Configuration
//!
//! Settings come from an optional JSON file with environment variables
//! layered on top. Empty values count as unset.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

pub const CONFIG_FILE_NAME: &str = "ria_config.json";
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_LINEAR_URL: &str = "https://api.linear.app/graphql";

fn default_database() -> String {
    "(default)".to_string()
}

fn default_firestore_url() -> String {
    DEFAULT_FIRESTORE_URL.to_string()
}

fn default_linear_url() -> String {
    DEFAULT_LINEAR_URL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    30
}

/// Remote document database settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreConfig {
    pub project_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_firestore_url")]
    pub base_url: String,
    /// How often the live feed re-reads a collection
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            api_key: None,
            database: default_database(),
            base_url: default_firestore_url(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Issue tracker settings; no key means export is disabled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_linear_url")]
    pub api_url: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_linear_url(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub firestore: Option<FirestoreConfig>,
    #[serde(default)]
    pub linear: TrackerConfig,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load `path` if it exists, then apply process environment overrides
    pub fn load(path: Option<&Path>) -> DomainResult<Self> {
        let base = match path {
            Some(p) if p.exists() => Self::from_file(p)?,
            _ => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> DomainResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| DomainError::Config(format!("Invalid config {}: {}", path.display(), e)))
    }

    /// Apply overrides from `lookup` (normally the process environment)
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(project_id) = get("RIA_FIRESTORE_PROJECT_ID") {
            self.firestore.get_or_insert_with(FirestoreConfig::default).project_id = project_id;
        }
        if let Some(firestore) = self.firestore.as_mut() {
            if let Some(key) = get("RIA_FIRESTORE_API_KEY") {
                firestore.api_key = Some(key);
            }
            if let Some(database) = get("RIA_FIRESTORE_DATABASE") {
                firestore.database = database;
            }
            if let Some(url) = get("RIA_FIRESTORE_BASE_URL") {
                firestore.base_url = url;
            }
            if let Some(interval) = get("RIA_POLL_INTERVAL_MS") {
                firestore.poll_interval_ms = interval.parse().map_err(|_| {
                    DomainError::Config(format!("RIA_POLL_INTERVAL_MS is not a number: {}", interval))
                })?;
            }
        }

        if let Some(key) = get("LINEAR_API_KEY").or_else(|| get("VITE_LINEAR_API_KEY")) {
            self.linear.api_key = Some(key);
        }
        if let Some(url) = get("RIA_LINEAR_API_URL") {
            self.linear.api_url = url;
        }
        if let Some(dir) = get("RIA_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir));
        }

        // blank keys in the file are treated like missing ones
        if self.linear.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.linear.api_key = None;
        }
        Ok(self)
    }

    pub fn is_export_enabled(&self) -> bool {
        self.linear.api_key.is_some()
    }
}
