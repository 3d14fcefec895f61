//! The job store contract.
//!
//! Implementations provide durable (or test-scoped) storage with atomic
//! claiming. Everything above the store - dispatch, timeouts, retry
//! policy - is worker policy and lives with the consumer.

use serde_json::Value;
use uuid::Uuid;

use crate::error::StoreError;
use crate::job::{Job, RetentionPolicy};

/// Durable, shared queue providing atomic claim and terminal-state
/// reporting.
///
/// # Implementer Notes
///
/// - `claim_next` must guarantee mutual exclusion across concurrent
///   callers: no two callers may receive the same job. Use
///   `FOR UPDATE SKIP LOCKED` (PostgreSQL) or a lock over the channel
///   state.
/// - The durability boundary is the store: once `submit` returns, the
///   job must survive the submitting process crashing (in-memory
///   backends relax this and say so).
/// - Retention is enforced at report time: success may delete the
///   record, failure prunes the channel's failed history to the job's
///   retention cap.
#[async_trait::async_trait]
pub trait JobStore: Send + Sync {
    /// Enqueue a job onto a channel.
    ///
    /// Returns the store-assigned job id. Fails with
    /// [`StoreError::Unavailable`] when the backing queue cannot accept
    /// the submission.
    async fn submit(
        &self,
        channel: &str,
        kind: &str,
        payload: Value,
        retention: RetentionPolicy,
    ) -> Result<Uuid, StoreError>;

    /// Atomically claim the next waiting job on a channel, oldest
    /// first, or return `None` when the channel is empty.
    ///
    /// The claimed job transitions to active and is owned by the caller
    /// until it reports an outcome. `worker_id` is recorded on the job
    /// for diagnostics.
    async fn claim_next(&self, channel: &str, worker_id: &str)
        -> Result<Option<Job>, StoreError>;

    /// Report that the handler for an active job succeeded.
    ///
    /// When the job's retention policy says `discard_on_success`, the
    /// record is deleted and a subsequent [`find`](Self::find) returns
    /// `None`.
    async fn report_success(&self, job_id: Uuid) -> Result<(), StoreError>;

    /// Report that the handler for an active job failed.
    ///
    /// The record transitions to failed with `error` attached, then the
    /// channel's failed history is pruned to the job's
    /// `max_retained_failures`, oldest evicted first.
    async fn report_failure(&self, job_id: Uuid, error: &str) -> Result<(), StoreError>;

    /// Look up a job record by id, in any state.
    async fn find(&self, job_id: Uuid) -> Result<Option<Job>, StoreError>;

    /// Retained failed records for a channel, newest first.
    async fn failed_jobs(&self, channel: &str) -> Result<Vec<Job>, StoreError>;
}
