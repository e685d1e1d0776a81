//! RIA Command Center Core
//!
//! Layered architecture:
//! - domain: Core entities and errors
//! - repository: Document store seam and the idea/vendor gateways
//! - store: Local reactive replicas fed by the live subscriptions
//! - analyzer, capture, dashboard, vendor_matrix: UI logic without views
//! - tracker: Issue export
//! - commands: User actions over `AppState`

use std::path::Path;
use std::sync::Arc;

pub mod analyzer;
pub mod capture;
pub mod commands;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod domain;
pub mod repository;
pub mod store;
pub mod tracker;
pub mod vendor_matrix;

use config::{AppConfig, CONFIG_FILE_NAME};
use context::SyncHandle;
use domain::{DomainError, DomainResult};
use repository::{DocumentStore, FirestoreStore, IdeaRepository, VendorRepository};
use store::{IdeaStore, VendorStore};
use tracker::IssueExporter;

pub const APP_NAME: &str = "ria-command-center";

/// Application state shared across commands
pub struct AppState {
    pub config: AppConfig,
    pub ideas: Arc<IdeaStore>,
    pub vendors: Arc<VendorStore>,
    pub idea_repo: IdeaRepository,
    pub vendor_repo: VendorRepository,
    pub exporter: IssueExporter,
}

impl AppState {
    pub fn new(documents: Arc<dyn DocumentStore>, exporter: IssueExporter, config: AppConfig) -> Self {
        Self {
            config,
            ideas: Arc::new(IdeaStore::default()),
            vendors: Arc::new(VendorStore::default()),
            idea_repo: IdeaRepository::new(documents.clone()),
            vendor_repo: VendorRepository::new(documents),
            exporter,
        }
    }

    /// Firestore-backed state; export is disabled when no tracker key is set
    pub fn from_config(config: AppConfig) -> DomainResult<Self> {
        let firestore = config
            .firestore
            .clone()
            .ok_or_else(|| DomainError::Config("Firestore is not configured".to_string()))?;
        let documents = Arc::new(FirestoreStore::new(firestore)?);
        let exporter = IssueExporter::from_config(&config.linear)?;
        Ok(Self::new(documents, exporter, config))
    }

    /// Load `ria_config.json` from `dir` (if present) plus environment overrides
    pub fn load(dir: &Path) -> DomainResult<Self> {
        let config = AppConfig::load(Some(&dir.join(CONFIG_FILE_NAME)))?;
        Self::from_config(config)
    }

    /// Install the rolling file logger under the configured log directory
    pub fn init_logging(&self, default_dir: &Path) {
        let dir = self.config.log_dir.as_deref().unwrap_or(default_dir);
        match rolling_logger::init_logger(dir, APP_NAME) {
            Ok(()) => {
                let _ = rolling_logger::info(&format!("Logging to {}", dir.display()));
            }
            Err(e) => eprintln!("Failed to initialize logger: {}", e),
        }
    }

    /// Start forwarding both live feeds into the local stores
    pub fn start_sync(&self) -> SyncHandle {
        let mut handle = SyncHandle::new();
        handle.forward("ideas", self.idea_repo.subscribe(), self.ideas.clone());
        handle.forward("vendors", self.vendor_repo.subscribe(), self.vendors.clone());
        log::info!("Live sync started");
        handle
    }
}
