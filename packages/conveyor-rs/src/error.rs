//! Store error types.

use uuid::Uuid;

use crate::job::JobState;

/// Errors surfaced by [`JobStore`](crate::JobStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing queue cannot accept or serve requests, e.g. the
    /// database is unreachable. Surfaced synchronously to producers;
    /// consumers log it and back off.
    #[error("queue unavailable: {0}")]
    Unavailable(String),

    /// No record exists for this job id.
    #[error("job {0} not found")]
    NotFound(Uuid),

    /// A terminal-state report was attempted against a job that is not
    /// active. Cannot happen when claim/report are paired correctly.
    #[error("job {id} is not active (state: {state})")]
    NotActive { id: Uuid, state: JobState },
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}
