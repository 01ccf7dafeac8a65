//! Shared application state.

use jobgraph_core::JobGraphConfig;
use jobgraph_store::GraphStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: JobGraphConfig,
    pub store: GraphStore,
}

impl AppState {
    pub fn new(config: JobGraphConfig, store: GraphStore) -> Self {
        Self { config, store }
    }
}
