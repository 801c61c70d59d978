//! Unified service container for warcdex
//!
//! Provides shared access to all core services.

use crate::core::config::Config;
use crate::core::ingest::Orchestrator;
use crate::core::storage::{IndexBackend, TantivyBackend};
use std::sync::Arc;

/// Unified services container
///
/// Every CLI command receives the same instance.
#[derive(Clone)]
pub struct Services {
    /// Index storage rooted at `index.storage_dir`
    pub backend: Arc<TantivyBackend>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration
    pub fn new(config: Config) -> Self {
        let backend = Arc::new(TantivyBackend::new(config.index.storage_dir.clone()));

        Self {
            backend,
            config: Arc::new(config),
        }
    }

    /// Create an orchestrator for one ingestion job
    pub fn create_orchestrator(&self) -> Orchestrator {
        let backend: Arc<dyn IndexBackend> = self.backend.clone();
        Orchestrator::new(Arc::clone(&self.config), backend)
    }
}
