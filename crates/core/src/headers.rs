// crates/core/src/headers.rs
//! Column header metadata for the sortable status table.

use serde::Serialize;

use crate::list::{ListQuery, SortDir, SortKey, DEFAULT_SORT_DIR};

/// Displayed columns, in order: `(id, name)`.
pub const SORTABLE_COLUMNS: &[(&str, &str)] = &[
    ("worker", "Worker / JID"),
    ("args", "Arguments"),
    ("update_time", "Last Updated"),
    ("pct_complete", "Progress"),
    ("elapsed", "Time Elapsed"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortableHeader {
    pub id: &'static str,
    pub name: &'static str,
    /// `sorted_asc` / `sorted_desc` on the active column only.
    pub class: Option<String>,
    /// Link that re-sorts the list by this column.
    pub url: String,
}

/// Direction requested by clicking `column` while the list is sorted by
/// `active` in `dir`: the active column flips, any other column starts at
/// the default direction.
pub fn toggle_dir(column: &str, active: SortKey, dir: SortDir) -> SortDir {
    if column == active.as_str() {
        dir.reverse()
    } else {
        DEFAULT_SORT_DIR
    }
}

pub fn build_headers(query: &ListQuery, active: SortKey, dir: SortDir) -> Vec<SortableHeader> {
    SORTABLE_COLUMNS
        .iter()
        .map(|&(id, name)| SortableHeader {
            id,
            name,
            class: (id == active.as_str()).then(|| format!("sorted_{}", dir.as_str())),
            url: sort_url(query, id, toggle_dir(id, active, dir)),
        })
        .collect()
}

/// `statuses?...` link keeping the request's other parameters.
fn sort_url(query: &ListQuery, sort_by: &str, sort_dir: SortDir) -> String {
    let kept = [
        ("worker", query.worker.as_deref()),
        ("status", query.status.as_deref()),
        ("per_page", query.per_page.as_deref()),
        ("page", query.page.as_deref()),
        ("poll", query.poll.as_deref()),
    ];
    let params: Vec<String> = kept
        .iter()
        .filter_map(|(k, v)| v.map(|v| (*k, v)))
        .chain([("sort_by", sort_by), ("sort_dir", sort_dir.as_str())])
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect();
    format!("statuses?{}", params.join("&"))
}
