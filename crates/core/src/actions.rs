// crates/core/src/actions.rs
//! Operator actions on a single job: retry and delete.
//!
//! Both treat a missing target as a successful no-op so repeated clicks are
//! harmless. Store failures propagate unchanged.

use serde::Serialize;

use crate::error::StoreError;
use crate::store::{FailedJobSet, StatusStore};

/// Which failed-job set a retried job was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedSetKind {
    Retry,
    Dead,
}

impl FailedSetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retry => "retry",
            Self::Dead => "dead",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RetryOutcome {
    Requeued { from: FailedSetKind },
    NotFound,
}

/// Re-enqueue `jid` from the retry set, or failing that the dead set.
pub async fn retry_job(
    jid: &str,
    retry_set: &dyn FailedJobSet,
    dead_set: &dyn FailedJobSet,
) -> Result<RetryOutcome, StoreError> {
    for (kind, set) in [(FailedSetKind::Retry, retry_set), (FailedSetKind::Dead, dead_set)] {
        if let Some(job) = set.find_job(jid).await? {
            set.retry(&job).await?;
            tracing::info!(jid, worker = %job.worker, from = kind.as_str(), "Job re-enqueued");
            return Ok(RetryOutcome::Requeued { from: kind });
        }
    }
    tracing::info!(jid, "Retry requested for job not in retry or dead set");
    Ok(RetryOutcome::NotFound)
}

/// Remove all status data for `jid`.
pub async fn delete_job(jid: &str, store: &dyn StatusStore) -> Result<(), StoreError> {
    store.delete(jid).await?;
    tracing::info!(jid, "Job status deleted");
    Ok(())
}
