//! Application state for the API server

use crate::Config;
use crate::metadata::MetadataStore;
use crate::tasks::TaskRegistry;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clones).
#[derive(Clone)]
pub struct AppState {
    /// Task facades, one per registered domain
    pub tasks: Arc<TaskRegistry>,

    /// Metadata store opened from `config.metadata`
    pub metadata: Arc<MetadataStore>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState, opening the configured metadata store
    pub fn new(tasks: Arc<TaskRegistry>, config: Arc<Config>) -> Self {
        let metadata = Arc::new(MetadataStore::from_config(&config.metadata));
        Self {
            tasks,
            metadata,
            config,
        }
    }
}
