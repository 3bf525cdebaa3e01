// crates/core/src/config.rs
//! Dashboard configuration: page sizes and the observed-job allow-list.
//!
//! Built once at startup and handed to `ListProcessor`; never mutated after.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE_OPTS: [usize; 3] = [25, 50, 100];
pub const DEFAULT_PER_PAGE: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Page sizes offered by the page-size selector.
    pub per_page_opts: Vec<usize>,
    /// Page size used when a request does not name a valid one.
    pub default_per_page: usize,
    /// Worker names shown on the dashboard. Empty shows nothing.
    pub observed_jobs: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            per_page_opts: DEFAULT_PER_PAGE_OPTS.to_vec(),
            default_per_page: DEFAULT_PER_PAGE,
            observed_jobs: Vec::new(),
        }
    }
}

impl DashboardConfig {
    pub fn with_observed_jobs<I, S>(mut self, jobs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.observed_jobs = jobs.into_iter().map(Into::into).collect();
        self
    }

    pub fn observes(&self, worker: &str) -> bool {
        self.observed_jobs.iter().any(|w| w == worker)
    }

    /// Repair values that would break pagination.
    ///
    /// Zero page sizes are dropped, an empty option list falls back to the
    /// defaults, and the default page size is always one of the options.
    pub fn normalized(mut self) -> Self {
        self.per_page_opts.retain(|n| *n > 0);
        if self.per_page_opts.is_empty() {
            tracing::warn!("Empty per_page_opts, using defaults");
            self.per_page_opts = DEFAULT_PER_PAGE_OPTS.to_vec();
        }
        if self.default_per_page == 0 {
            tracing::warn!(default = DEFAULT_PER_PAGE, "default_per_page must be positive");
            self.default_per_page = DEFAULT_PER_PAGE;
        }
        if !self.per_page_opts.contains(&self.default_per_page) {
            self.per_page_opts.push(self.default_per_page);
        }
        self.per_page_opts.sort_unstable();
        self.per_page_opts.dedup();
        self
    }
}
