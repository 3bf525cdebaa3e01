// crates/core/src/types.rs
//! Status record model shared by the enrichment and list pipeline.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Field names owned by the status store or computed by enrichment.
///
/// A job may attach arbitrary extra fields to its status; anything listed
/// here is never reported back as custom data.
pub const RESERVED_FIELDS: &[&str] = &[
    "update_time",
    "jid",
    "status",
    "worker",
    "args",
    "label",
    "pct_complete",
    "total",
    "at",
    "message",
    "working_at",
    "elapsed",
    "eta",
];

/// Minimum number of populated fields (besides `jid`) a record needs before
/// it is shown on the dashboard.
pub const MIN_POPULATED_FIELDS: usize = 2;

pub fn is_reserved(name: &str) -> bool {
    RESERVED_FIELDS.contains(&name)
}

// ============================================================================
// Status classification
// ============================================================================

/// Lifecycle state reported by the status store.
///
/// Unknown states are preserved in `Other` so filters still match them and
/// classification falls back to the danger label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Queued,
    Working,
    Retrying,
    Complete,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "queued" => Self::Queued,
            "working" => Self::Working,
            "retrying" => Self::Retrying,
            "complete" => Self::Complete,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Working => "working",
            Self::Retrying => "retrying",
            Self::Complete => "complete",
            Self::Failed => "failed",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// Severity class used by the presentation layer to color a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Success,
    Warning,
    Primary,
    Danger,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Primary => "primary",
            Self::Danger => "danger",
        }
    }
}

// ============================================================================
// Status record
// ============================================================================

/// Snapshot of one job execution attempt as held by the status store.
///
/// `pct_complete` and `eta` are the store's own estimates; they stay `None`
/// until the store reports them (see `StatusService` backfill).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub jid: String,
    #[serde(default)]
    pub worker: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pct_complete: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<i64>,
    /// Job-supplied fields outside the well-known set.
    #[serde(flatten)]
    pub extras: BTreeMap<String, Value>,
}

impl StatusRecord {
    /// Empty record carrying only its identity.
    pub fn new(jid: impl Into<String>) -> Self {
        Self {
            jid: jid.into(),
            worker: String::new(),
            args: Vec::new(),
            status: None,
            update_time: None,
            working_at: None,
            total: None,
            at: None,
            message: None,
            pct_complete: None,
            eta: None,
            extras: BTreeMap::new(),
        }
    }

    /// Build a record from the store's flat field hash.
    ///
    /// Unparsable numeric values are dropped rather than rejected. `args` is
    /// read as a JSON array and otherwise kept as a single string argument.
    pub fn from_fields(jid: impl Into<String>, fields: HashMap<String, String>) -> Self {
        let mut record = Self::new(jid);
        for (key, value) in fields {
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "worker" => record.worker = value,
                "args" => {
                    record.args = serde_json::from_str::<Vec<Value>>(&value)
                        .unwrap_or_else(|_| vec![Value::String(value)]);
                }
                "status" => record.status = Some(JobStatus::parse(&value)),
                "update_time" => record.update_time = parse_int(&value),
                "working_at" => record.working_at = parse_int(&value),
                "eta" => record.eta = parse_int(&value),
                "total" => record.total = parse_count(&value),
                "at" => record.at = parse_count(&value),
                "message" => record.message = Some(value),
                "pct_complete" => {
                    record.pct_complete = parse_count(&value).map(|p| p.min(100) as u8);
                }
                k if is_reserved(k) => {}
                _ => {
                    record.extras.insert(key, Value::String(value));
                }
            }
        }
        record
    }

    /// Number of populated fields besides `jid`.
    pub fn populated_field_count(&self) -> usize {
        let known = [
            !self.worker.is_empty(),
            !self.args.is_empty(),
            self.status.is_some(),
            self.update_time.is_some(),
            self.working_at.is_some(),
            self.total.is_some(),
            self.at.is_some(),
            self.message.is_some(),
            self.pct_complete.is_some(),
            self.eta.is_some(),
        ];
        let custom = self.extras.keys().filter(|k| !is_reserved(k)).count();
        known.iter().filter(|populated| **populated).count() + custom
    }

    /// Whether the store has recorded real progress data for this job.
    pub fn is_eligible(&self) -> bool {
        self.populated_field_count() >= MIN_POPULATED_FIELDS
    }

    /// Extras with every reserved name removed.
    pub fn custom_fields(&self) -> BTreeMap<String, Value> {
        self.extras
            .iter()
            .filter(|(k, _)| !is_reserved(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref().map(JobStatus::as_str)
    }
}

fn parse_int(value: &str) -> Option<i64> {
    let value = value.trim();
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
}

fn parse_count(value: &str) -> Option<u64> {
    parse_int(value).and_then(|n| u64::try_from(n).ok())
}

/// Store-side percent: `floor(100 * at / total)`, 0 when `total` is unknown
/// or zero, capped at 100.
pub fn pct_from_counts(at: Option<u64>, total: Option<u64>) -> u8 {
    match (at, total) {
        (Some(at), Some(total)) if total > 0 => {
            let pct = (u128::from(at) * 100) / u128::from(total);
            pct.min(100) as u8
        }
        _ => 0,
    }
}

/// Rate-based remaining-time estimate in seconds: time spent per unit so far
/// multiplied by the units left. `None` until at least one unit is done.
pub fn estimate_eta(working_at: Option<i64>, at: Option<u64>, total: Option<u64>, now: i64) -> Option<i64> {
    let working_at = working_at?;
    let total = total?;
    let at = at.filter(|at| *at > 0)?;
    let spent = now.saturating_sub(working_at).max(0) as f64;
    let remaining = total.saturating_sub(at) as f64;
    Some((spent / at as f64 * remaining).round() as i64)
}

// ============================================================================
// Enriched status
// ============================================================================

/// A status record plus its display-only derived fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedStatus {
    pub jid: String,
    pub worker: String,
    pub args: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub label: Label,
    pub pct_complete: u8,
    /// Seconds as a string, empty when elapsed time does not apply.
    pub elapsed: String,
    /// Seconds as a string, empty unless the job is working.
    pub eta: String,
    pub custom: BTreeMap<String, Value>,
}

impl EnrichedStatus {
    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref().map(JobStatus::as_str)
    }
}
