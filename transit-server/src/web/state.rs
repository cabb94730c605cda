//! Application state for the web layer.

use std::sync::Arc;

use crate::graph::TransitNetwork;
use crate::planner::SearchConfig;

/// Shared application state.
///
/// The network is immutable once loaded, so handlers share it without
/// locking.
#[derive(Clone)]
pub struct AppState {
    /// Routable transit network
    pub network: Arc<TransitNetwork>,

    /// Default search parameters
    pub config: Arc<SearchConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(network: TransitNetwork, config: SearchConfig) -> Self {
        Self {
            network: Arc::new(network),
            config: Arc::new(config),
        }
    }
}
