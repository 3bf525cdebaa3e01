// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use jobwatch_core::memory::MemoryBackends;
use jobwatch_core::{DashboardConfig, StatusService};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Status pipeline and operator actions over the job stores.
    pub statuses: StatusService,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(statuses: StatusService) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            statuses,
        })
    }

    /// State backed by in-memory job stores.
    pub fn in_memory(backends: &MemoryBackends, config: DashboardConfig) -> Arc<Self> {
        Self::new(backends.service(config))
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
