// crates/core/src/lib.rs
//! Job status dashboard core: record model, metric enrichment, list
//! processing, header metadata and operator actions.

pub mod actions;
pub mod config;
pub mod enrich;
pub mod error;
pub mod headers;
pub mod list;
pub mod memory;
pub mod service;
pub mod store;
pub mod types;

pub use actions::{FailedSetKind, RetryOutcome};
pub use config::DashboardConfig;
pub use enrich::enrich;
pub use error::*;
pub use headers::SortableHeader;
pub use list::{ListProcessor, ListQuery, ListView, SortDir, SortKey, DEFAULT_SORT_DIR};
pub use service::StatusService;
pub use store::{FailedJob, FailedJobSet, StatusStore, WorkSnapshot};
pub use types::*;
