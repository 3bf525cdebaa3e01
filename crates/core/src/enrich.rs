// crates/core/src/enrich.rs
//! Derived display metrics for a single status record.
//!
//! Everything here is a pure function of the record and a caller-sampled
//! `now` (epoch seconds). Missing inputs degrade to empty/zero values.

use crate::types::{EnrichedStatus, JobStatus, Label, StatusRecord};

/// Map a status to its severity label. Absent or unknown statuses are danger.
pub fn status_label(status: Option<&JobStatus>) -> Label {
    match status {
        Some(JobStatus::Complete) => Label::Success,
        Some(JobStatus::Working | JobStatus::Retrying) => Label::Warning,
        Some(JobStatus::Queued) => Label::Primary,
        Some(JobStatus::Failed | JobStatus::Other(_)) | None => Label::Danger,
    }
}

/// Completed jobs always read as 100, whatever the stored counters say.
pub fn pct_complete(record: &StatusRecord) -> u8 {
    match record.status {
        Some(JobStatus::Complete) => 100,
        _ => record.pct_complete.map_or(0, |p| p.min(100)),
    }
}

/// Seconds spent working, clamped at zero.
pub fn elapsed_secs(record: &StatusRecord, now: i64) -> Option<i64> {
    let end = match record.status {
        Some(JobStatus::Complete) => record.update_time?,
        Some(JobStatus::Working | JobStatus::Retrying) => now,
        _ => return None,
    };
    let started = record.working_at?;
    Some(end.saturating_sub(started).max(0))
}

/// Remaining-time estimate, only meaningful while working.
pub fn eta_secs(record: &StatusRecord) -> Option<i64> {
    match record.status {
        Some(JobStatus::Working) => record.eta.map(|eta| eta.max(0)),
        _ => None,
    }
}

fn format_secs(secs: Option<i64>) -> String {
    secs.map(|s| s.to_string()).unwrap_or_default()
}

/// Annotate a record with its derived display fields.
pub fn enrich(record: &StatusRecord, now: i64) -> EnrichedStatus {
    EnrichedStatus {
        jid: record.jid.clone(),
        worker: record.worker.clone(),
        args: record.args.clone(),
        status: record.status.clone(),
        update_time: record.update_time,
        working_at: record.working_at,
        total: record.total,
        at: record.at,
        message: record.message.clone(),
        label: status_label(record.status.as_ref()),
        pct_complete: pct_complete(record),
        elapsed: format_secs(elapsed_secs(record, now)),
        eta: format_secs(eta_secs(record)),
        custom: record.custom_fields(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::pct_from_counts;
    use serde_json::json;

    fn working_record() -> StatusRecord {
        StatusRecord {
            worker: "W".to_string(),
            status: Some(JobStatus::Working),
            working_at: Some(100),
            at: Some(5),
            total: Some(10),
            pct_complete: Some(pct_from_counts(Some(5), Some(10))),
            ..StatusRecord::new("a")
        }
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let complete = StatusRecord {
            status: Some(JobStatus::Complete),
            update_time: Some(i64::MAX),
            working_at: Some(-10),
            ..working_record()
        };
        assert_eq!(enrich(&complete, 0).elapsed, i64::MAX.to_string());

        let working = StatusRecord {
            working_at: Some(i64::MAX),
            ..working_record()
        };
        assert_eq!(enrich(&working, i64::MIN).elapsed, "0");
    }

    #[test]
    fn test_enrich_working_job() {
        let enriched = enrich(&working_record(), 130);
        assert_eq!(enriched.pct_complete, 50);
        assert_eq!(enriched.elapsed, "30");
        assert_eq!(enriched.label, Label::Warning);
        assert_eq!(enriched.eta, "");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(Some(&JobStatus::Complete)), Label::Success);
        assert_eq!(status_label(Some(&JobStatus::Working)), Label::Warning);
        assert_eq!(status_label(Some(&JobStatus::Retrying)), Label::Warning);
        assert_eq!(status_label(Some(&JobStatus::Queued)), Label::Primary);
        assert_eq!(status_label(Some(&JobStatus::Failed)), Label::Danger);
        assert_eq!(
            status_label(Some(&JobStatus::Other("interrupted".into()))),
            Label::Danger
        );
        assert_eq!(status_label(None), Label::Danger);
    }

    #[test]
    fn test_complete_forces_full_progress() {
        let record = StatusRecord {
            status: Some(JobStatus::Complete),
            at: Some(2),
            total: Some(10),
            pct_complete: Some(20),
            ..working_record()
        };
        assert_eq!(pct_complete(&record), 100);

        let no_counters = StatusRecord {
            status: Some(JobStatus::Complete),
            at: None,
            total: None,
            pct_complete: None,
            ..working_record()
        };
        assert_eq!(pct_complete(&no_counters), 100);
    }

    #[test]
    fn test_pct_defaults_to_zero_without_store_value() {
        let record = StatusRecord {
            pct_complete: None,
            ..working_record()
        };
        assert_eq!(pct_complete(&record), 0);
    }

    #[test]
    fn test_elapsed_for_complete_uses_update_time() {
        let record = StatusRecord {
            status: Some(JobStatus::Complete),
            update_time: Some(160),
            ..working_record()
        };
        assert_eq!(elapsed_secs(&record, 9_999), Some(60));
    }

    #[test]
    fn test_elapsed_absent_before_work_starts() {
        for status in [JobStatus::Queued, JobStatus::Failed, JobStatus::Other("x".into())] {
            let record = StatusRecord {
                status: Some(status),
                ..working_record()
            };
            assert_eq!(elapsed_secs(&record, 130), None);
            assert_eq!(enrich(&record, 130).elapsed, "");
        }
    }

    #[test]
    fn test_elapsed_missing_working_at_or_clock_skew() {
        let record = StatusRecord {
            working_at: None,
            ..working_record()
        };
        assert_eq!(elapsed_secs(&record, 130), None);

        let skewed = StatusRecord {
            status: Some(JobStatus::Retrying),
            working_at: Some(200),
            ..working_record()
        };
        assert_eq!(elapsed_secs(&skewed, 130), Some(0));
    }

    #[test]
    fn test_eta_only_while_working() {
        let record = StatusRecord {
            eta: Some(42),
            ..working_record()
        };
        assert_eq!(enrich(&record, 130).eta, "42");

        let retrying = StatusRecord {
            status: Some(JobStatus::Retrying),
            ..record
        };
        assert_eq!(enrich(&retrying, 130).eta, "");
    }

    #[test]
    fn test_custom_excludes_reserved_names() {
        let mut record = working_record();
        record.extras.insert("tenant".to_string(), json!("acme"));
        record.extras.insert("label".to_string(), json!("fake"));
        let enriched = enrich(&record, 130);
        assert_eq!(enriched.custom.len(), 1);
        assert_eq!(enriched.custom["tenant"], json!("acme"));
        assert_eq!(enriched.label, Label::Warning);
    }
}
