//! Worker-side dispatch errors.
//!
//! All of these are contained at the worker boundary: they become the
//! failed job's recorded error text and never terminate the loop.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The claimed job's kind has no registered handler. Reported as a
    /// failure without invoking anything.
    #[error("unknown job kind: {0}")]
    UnknownKind(String),

    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Handler(#[source] anyhow::Error),

    /// The handler exceeded the worker's execution budget.
    #[error("handler timed out after {0:?}")]
    Timeout(Duration),
}
