// crates/core/src/store.rs
//! Interfaces to the external job-tracking collaborators.
//!
//! The pipeline only reads snapshots through these traits and delegates the
//! two operator actions to them. Implementations own persistence and their
//! own consistency guarantees.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;
use crate::types::StatusRecord;

/// Source of the job ids currently being worked on.
#[async_trait]
pub trait WorkSnapshot: Send + Sync {
    async fn in_flight_jids(&self) -> Result<Vec<String>, StoreError>;
}

/// Per-job status storage.
///
/// The single-value accessors are consulted only when a record returned by
/// `get_all` is missing the corresponding field.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Full status snapshot, `None` when nothing is stored for `jid`.
    async fn get_all(&self, jid: &str) -> Result<Option<StatusRecord>, StoreError>;

    /// Remove all status data for `jid`. Missing ids are not an error.
    async fn delete(&self, jid: &str) -> Result<(), StoreError>;

    async fn pct_complete(&self, jid: &str) -> Result<Option<u8>, StoreError>;

    async fn working_at(&self, jid: &str) -> Result<Option<i64>, StoreError>;

    async fn update_time(&self, jid: &str) -> Result<Option<i64>, StoreError>;

    async fn eta(&self, jid: &str) -> Result<Option<i64>, StoreError>;
}

/// A failed job parked in the retry set or the dead set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedJob {
    pub jid: String,
    pub worker: String,
    pub args: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl FailedJob {
    pub fn new(jid: impl Into<String>, worker: impl Into<String>) -> Self {
        Self {
            jid: jid.into(),
            worker: worker.into(),
            args: Vec::new(),
            error_message: None,
        }
    }
}

/// Retry set or dead set of failed jobs.
#[async_trait]
pub trait FailedJobSet: Send + Sync {
    async fn find_job(&self, jid: &str) -> Result<Option<FailedJob>, StoreError>;

    /// Re-enqueue a job previously returned by `find_job`.
    async fn retry(&self, job: &FailedJob) -> Result<(), StoreError>;
}
