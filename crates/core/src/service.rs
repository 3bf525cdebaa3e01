// crates/core/src/service.rs
//! Entry points used by the transport shell.
//!
//! `StatusService` pulls a snapshot from the collaborators, backfills missing
//! values through the store accessors and hands the records to the pure
//! pipeline. It keeps no state between calls.

use std::collections::HashSet;
use std::sync::Arc;

use crate::actions::{self, RetryOutcome};
use crate::config::DashboardConfig;
use crate::enrich::enrich;
use crate::error::{StatusError, StoreError};
use crate::list::{ListProcessor, ListQuery, ListView};
use crate::store::{FailedJobSet, StatusStore, WorkSnapshot};
use crate::types::{EnrichedStatus, JobStatus, StatusRecord};

pub struct StatusService {
    store: Arc<dyn StatusStore>,
    work: Arc<dyn WorkSnapshot>,
    retry_set: Arc<dyn FailedJobSet>,
    dead_set: Arc<dyn FailedJobSet>,
    processor: ListProcessor,
}

impl StatusService {
    pub fn new(
        store: Arc<dyn StatusStore>,
        work: Arc<dyn WorkSnapshot>,
        retry_set: Arc<dyn FailedJobSet>,
        dead_set: Arc<dyn FailedJobSet>,
        config: DashboardConfig,
    ) -> Self {
        Self {
            store,
            work,
            retry_set,
            dead_set,
            processor: ListProcessor::new(config),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        self.processor.config()
    }

    /// Distinct jobs in the work snapshot. Fails when the snapshot is unreachable.
    pub async fn in_flight_count(&self) -> Result<usize, StoreError> {
        let jids = self.work.in_flight_jids().await?;
        Ok(jids.iter().collect::<HashSet<_>>().len())
    }

    pub async fn list_statuses(&self, query: &ListQuery) -> Result<ListView, StoreError> {
        self.list_statuses_at(query, now()).await
    }

    /// `list_statuses` with an explicit clock.
    pub async fn list_statuses_at(&self, query: &ListQuery, now: i64) -> Result<ListView, StoreError> {
        let jids = self.work.in_flight_jids().await?;
        let mut seen = HashSet::with_capacity(jids.len());
        let mut records = Vec::with_capacity(jids.len());

        for jid in jids {
            if !seen.insert(jid.clone()) {
                continue;
            }
            let Some(record) = self.store.get_all(&jid).await? else {
                continue;
            };
            if !self.processor.admits(&record) {
                continue;
            }
            records.push(self.backfill(record).await?);
        }

        Ok(self.processor.process(records, query, now))
    }

    pub async fn get_status(&self, jid: &str) -> Result<EnrichedStatus, StatusError> {
        self.get_status_at(jid, now()).await
    }

    /// `get_status` with an explicit clock.
    pub async fn get_status_at(&self, jid: &str, now: i64) -> Result<EnrichedStatus, StatusError> {
        let record = self
            .store
            .get_all(jid)
            .await?
            .filter(|r| r.populated_field_count() > 0)
            .ok_or_else(|| StatusError::not_found(jid))?;
        let record = self.backfill(record).await?;
        Ok(enrich(&record, now))
    }

    pub async fn retry_job(&self, jid: &str) -> Result<RetryOutcome, StoreError> {
        actions::retry_job(jid, self.retry_set.as_ref(), self.dead_set.as_ref()).await
    }

    pub async fn delete_job(&self, jid: &str) -> Result<(), StoreError> {
        actions::delete_job(jid, self.store.as_ref()).await
    }

    /// Fill fields the snapshot lacks from the store's single-value accessors.
    async fn backfill(&self, mut record: StatusRecord) -> Result<StatusRecord, StoreError> {
        let jid = record.jid.clone();
        if record.working_at.is_none() {
            record.working_at = self.store.working_at(&jid).await?;
        }
        if record.update_time.is_none() {
            record.update_time = self.store.update_time(&jid).await?;
        }
        let complete = matches!(record.status, Some(JobStatus::Complete));
        if record.pct_complete.is_none() && !complete {
            record.pct_complete = self.store.pct_complete(&jid).await?;
        }
        let working = matches!(record.status, Some(JobStatus::Working));
        if record.eta.is_none() && working {
            record.eta = self.store.eta(&jid).await?;
        }
        Ok(record)
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
