// crates/core/src/memory.rs
//! In-process implementations of the store traits.
//!
//! Used by the server binary when no external job store is wired in, and by
//! tests. Lock poisoning is logged and reported as `StoreError::Unavailable`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::config::DashboardConfig;
use crate::error::StoreError;
use crate::service::StatusService;
use crate::store::{FailedJob, FailedJobSet, StatusStore, WorkSnapshot};
use crate::types::{estimate_eta, pct_from_counts, StatusRecord};

fn read<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockReadGuard<'a, T>, StoreError> {
    lock.read().map_err(|e| {
        tracing::error!("RwLock poisoned reading {what}: {e}");
        StoreError::unavailable(format!("{what} lock poisoned"))
    })
}

fn write<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockWriteGuard<'a, T>, StoreError> {
    lock.write().map_err(|e| {
        tracing::error!("RwLock poisoned writing {what}: {e}");
        StoreError::unavailable(format!("{what} lock poisoned"))
    })
}

// ============================================================================
// Status store
// ============================================================================

/// Status records keyed by job id.
#[derive(Default)]
pub struct MemoryStatusStore {
    records: RwLock<HashMap<String, StatusRecord>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record. `update_time` never moves backwards.
    pub fn insert(&self, mut record: StatusRecord) {
        match self.records.write() {
            Ok(mut records) => {
                if let Some(existing) = records.get(&record.jid) {
                    record.update_time = record.update_time.max(existing.update_time);
                }
                records.insert(record.jid.clone(), record);
            }
            Err(e) => tracing::error!("RwLock poisoned writing status records: {e}"),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_record<T>(
        &self,
        jid: &str,
        f: impl FnOnce(&StatusRecord) -> Option<T>,
    ) -> Result<Option<T>, StoreError> {
        Ok(read(&self.records, "status records")?.get(jid).and_then(f))
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn get_all(&self, jid: &str) -> Result<Option<StatusRecord>, StoreError> {
        self.with_record(jid, |r| Some(r.clone()))
    }

    async fn delete(&self, jid: &str) -> Result<(), StoreError> {
        write(&self.records, "status records")?.remove(jid);
        Ok(())
    }

    async fn pct_complete(&self, jid: &str) -> Result<Option<u8>, StoreError> {
        self.with_record(jid, |r| Some(r.pct_complete.unwrap_or_else(|| pct_from_counts(r.at, r.total))))
    }

    async fn working_at(&self, jid: &str) -> Result<Option<i64>, StoreError> {
        self.with_record(jid, |r| r.working_at)
    }

    async fn update_time(&self, jid: &str) -> Result<Option<i64>, StoreError> {
        self.with_record(jid, |r| r.update_time)
    }

    async fn eta(&self, jid: &str) -> Result<Option<i64>, StoreError> {
        let now = chrono::Utc::now().timestamp();
        self.with_record(jid, |r| r.eta.or_else(|| estimate_eta(r.working_at, r.at, r.total, now)))
    }
}

// ============================================================================
// Work snapshot
// ============================================================================

/// Ordered list of in-flight job ids.
#[derive(Default)]
pub struct MemoryWorkSet {
    jids: RwLock<Vec<String>>,
}

impl MemoryWorkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, jid: impl Into<String>) {
        match self.jids.write() {
            Ok(mut jids) => jids.push(jid.into()),
            Err(e) => tracing::error!("RwLock poisoned writing work set: {e}"),
        }
    }

    pub fn remove(&self, jid: &str) {
        match self.jids.write() {
            Ok(mut jids) => jids.retain(|j| j != jid),
            Err(e) => tracing::error!("RwLock poisoned writing work set: {e}"),
        }
    }
}

#[async_trait]
impl WorkSnapshot for MemoryWorkSet {
    async fn in_flight_jids(&self) -> Result<Vec<String>, StoreError> {
        Ok(read(&self.jids, "work set")?.clone())
    }
}

// ============================================================================
// Failed job sets
// ============================================================================

/// Retry or dead set. Retrying moves a job into `requeued`.
#[derive(Default)]
pub struct MemoryJobSet {
    jobs: RwLock<Vec<FailedJob>>,
    requeued: RwLock<Vec<FailedJob>>,
}

impl MemoryJobSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, job: FailedJob) {
        match self.jobs.write() {
            Ok(mut jobs) => jobs.push(job),
            Err(e) => tracing::error!("RwLock poisoned writing failed jobs: {e}"),
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.read().map(|j| j.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Jobs handed back to the queue, oldest first.
    pub fn requeued(&self) -> Vec<FailedJob> {
        match self.requeued.read() {
            Ok(requeued) => requeued.clone(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading requeued jobs: {e}");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl FailedJobSet for MemoryJobSet {
    async fn find_job(&self, jid: &str) -> Result<Option<FailedJob>, StoreError> {
        Ok(read(&self.jobs, "failed jobs")?
            .iter()
            .find(|j| j.jid == jid)
            .cloned())
    }

    async fn retry(&self, job: &FailedJob) -> Result<(), StoreError> {
        // A concurrent retry may already have moved it; enqueue anyway.
        write(&self.jobs, "failed jobs")?.retain(|j| j.jid != job.jid);
        write(&self.requeued, "requeued jobs")?.push(job.clone());
        Ok(())
    }
}

// ============================================================================
// Wiring
// ============================================================================

/// The full set of in-memory collaborators, shareable with a `StatusService`.
#[derive(Clone, Default)]
pub struct MemoryBackends {
    pub store: Arc<MemoryStatusStore>,
    pub work: Arc<MemoryWorkSet>,
    pub retry_set: Arc<MemoryJobSet>,
    pub dead_set: Arc<MemoryJobSet>,
}

impl MemoryBackends {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record and mark its job in flight.
    pub fn track(&self, record: StatusRecord) {
        self.work.push(record.jid.clone());
        self.store.insert(record);
    }

    /// Load records, skipping duplicate job ids after the first.
    pub fn seed<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = StatusRecord>,
    {
        let mut seen = HashSet::new();
        let mut count = 0;
        for record in records {
            if seen.insert(record.jid.clone()) {
                self.track(record);
                count += 1;
            }
        }
        count
    }

    pub fn service(&self, config: DashboardConfig) -> StatusService {
        StatusService::new(
            self.store.clone(),
            self.work.clone(),
            self.retry_set.clone(),
            self.dead_set.clone(),
            config,
        )
    }
}
