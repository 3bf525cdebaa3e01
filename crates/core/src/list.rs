// crates/core/src/list.rs
//! Filter, sort and paginate status records for the dashboard list.
//!
//! Request values arrive as raw strings. None of them can fail the request:
//! unknown sort keys, bad page numbers and unknown filters fall back to
//! defaults.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::enrich::enrich;
use crate::headers::{build_headers, SortableHeader};
use crate::types::{EnrichedStatus, StatusRecord};

/// Filter value that disables the worker or status filter.
pub const ALL: &str = "all";

/// Direction applied when the request does not ask for one, and requested
/// when switching to a new sort column.
pub const DEFAULT_SORT_DIR: SortDir = SortDir::Desc;

// ============================================================================
// Request types
// ============================================================================

/// Raw list request parameters, as received from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub worker: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    /// Auto-refresh flag; carried through header links untouched.
    pub poll: Option<String>,
}

impl ListQuery {
    /// Build from raw `key=value` pairs. A repeated key keeps its last value;
    /// unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "worker" => &mut query.worker,
                "status" => &mut query.status,
                "sort_by" => &mut query.sort_by,
                "sort_dir" => &mut query.sort_dir,
                "page" => &mut query.page,
                "per_page" => &mut query.per_page,
                "poll" => &mut query.poll,
                _ => continue,
            };
            *slot = Some(value);
        }
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Worker,
    Status,
    UpdateTime,
    PctComplete,
    Message,
    Args,
}

impl SortKey {
    pub const DEFAULT: SortKey = SortKey::UpdateTime;

    /// Parse an allow-listed sort column; anything else sorts by update time.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("worker") => Self::Worker,
            Some("status") => Self::Status,
            Some("update_time") => Self::UpdateTime,
            Some("pct_complete") => Self::PctComplete,
            Some("message") => Self::Message,
            Some("args") => Self::Args,
            _ => Self::DEFAULT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Status => "status",
            Self::UpdateTime => "update_time",
            Self::PctComplete => "pct_complete",
            Self::Message => "message",
            Self::Args => "args",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("asc") => Self::Asc,
            Some("desc") => Self::Desc,
            _ => DEFAULT_SORT_DIR,
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

// ============================================================================
// List view
// ============================================================================

/// One page of the dashboard list.
#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub statuses: Vec<EnrichedStatus>,
    /// Matching records after user filters, before pagination.
    pub total_size: usize,
    pub current_page: usize,
    pub page_size: usize,
    /// Distinct workers across all eligible records, plus `"all"`.
    pub workers: BTreeSet<String>,
    pub sort_by: SortKey,
    pub sort_dir: SortDir,
    pub headers: Vec<SortableHeader>,
    pub per_page_opts: Vec<usize>,
}

pub struct ListProcessor {
    config: DashboardConfig,
}

impl ListProcessor {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Eligible for display: real progress data and an observed worker.
    pub fn admits(&self, record: &StatusRecord) -> bool {
        record.is_eligible() && self.config.observes(&record.worker)
    }

    /// Run the full list pipeline over a snapshot of records.
    pub fn process<I>(&self, records: I, query: &ListQuery, now: i64) -> ListView
    where
        I: IntoIterator<Item = StatusRecord>,
    {
        let mut workers = BTreeSet::from([ALL.to_string()]);
        let mut statuses = Vec::new();
        let mut dropped = 0usize;

        for record in records {
            if !self.admits(&record) {
                dropped += 1;
                continue;
            }
            workers.insert(record.worker.clone());
            statuses.push(enrich(&record, now));
        }

        let worker_filter = active_filter(query.worker.as_deref());
        let status_filter = active_filter(query.status.as_deref());
        statuses.retain(|s| {
            worker_filter.map_or(true, |w| s.worker == w)
                && status_filter.map_or(true, |st| s.status_str() == Some(st))
        });

        let sort_by = SortKey::parse(query.sort_by.as_deref());
        let sort_dir = SortDir::parse(query.sort_dir.as_deref());
        sort_statuses(&mut statuses, sort_by, sort_dir);

        let total_size = statuses.len();
        let page_size = self.page_size(query.per_page.as_deref(), total_size);
        let current_page = parse_page(query.page.as_deref());
        let statuses = paginate(statuses, current_page, page_size);

        tracing::debug!(
            dropped,
            total_size,
            page = current_page,
            page_size,
            sort_by = sort_by.as_str(),
            sort_dir = sort_dir.as_str(),
            "Processed status list"
        );

        ListView {
            statuses,
            total_size,
            current_page,
            page_size,
            workers,
            sort_by,
            sort_dir,
            headers: build_headers(query, sort_by, sort_dir),
            per_page_opts: self.config.per_page_opts.clone(),
        }
    }

    /// Effective page size. `"all"` shows every match on one page.
    fn page_size(&self, requested: Option<&str>, total: usize) -> usize {
        match requested.map(str::trim) {
            Some(ALL) => total.max(1),
            Some(s) => s
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(self.config.default_per_page),
            None => self.config.default_per_page,
        }
    }
}

fn active_filter(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != ALL)
}

/// Page numbers below 1 (or unparsable) clamp to the first page.
pub fn parse_page(value: Option<&str>) -> usize {
    value
        .and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .and_then(|p| usize::try_from(p).ok())
        .unwrap_or(1)
}

/// Slice out one page; offsets past the end yield an empty page.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Vec<T> {
    let offset = page.saturating_sub(1).saturating_mul(page_size);
    items.into_iter().skip(offset).take(page_size).collect()
}

/// Sort by one column, breaking ties by `jid` so repeated calls agree.
///
/// Absent values order before present ones in ascending order.
pub fn sort_statuses(statuses: &mut [EnrichedStatus], key: SortKey, dir: SortDir) {
    statuses.sort_by(|a, b| {
        let ord = compare_by(a, b, key);
        let ord = match dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        };
        ord.then_with(|| a.jid.cmp(&b.jid))
    });
}

fn compare_by(a: &EnrichedStatus, b: &EnrichedStatus, key: SortKey) -> Ordering {
    match key {
        SortKey::Worker => a.worker.cmp(&b.worker),
        SortKey::Status => a.status_str().cmp(&b.status_str()),
        SortKey::UpdateTime => a.update_time.cmp(&b.update_time),
        SortKey::PctComplete => a.pct_complete.cmp(&b.pct_complete),
        SortKey::Message => a.message.cmp(&b.message),
        SortKey::Args => args_key(a).cmp(&args_key(b)),
    }
}

fn args_key(status: &EnrichedStatus) -> String {
    status
        .args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
