// crates/core/src/error.rs
use thiserror::Error;

/// Errors raised by the external status, work and failed-job stores.
///
/// These are never masked by the pipeline: they propagate unchanged to the
/// caller, which treats them as fatal for the request.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Status store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the single-job status lookup.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Job status not found: {jid}")]
    NotFound { jid: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

impl StatusError {
    pub fn not_found(jid: impl Into<String>) -> Self {
        Self::NotFound { jid: jid.into() }
    }
}
