//! Job model and retention policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a job.
///
/// Transitions are monotonic: `Waiting → Active → {Completed | Failed}`.
/// The store enforces this; a report against a non-active job fails with
/// [`StoreError::NotActive`](crate::StoreError::NotActive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "job_state", rename_all = "snake_case")
)]
pub enum JobState {
    /// Submitted, not yet claimed by any worker.
    #[default]
    Waiting,
    /// Claimed; owned exclusively by one worker.
    Active,
    /// Handler reported success. Only observable when the job's
    /// retention policy keeps completed records.
    Completed,
    /// Handler reported failure; retained subject to the retention cap.
    Failed,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Waiting => "waiting",
            JobState::Active => "active",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// How long a job record survives after reaching a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct RetentionPolicy {
    /// Delete the record immediately on success instead of keeping a
    /// completed row around.
    pub discard_on_success: bool,
    /// Number of most-recent failed records kept per channel; older
    /// records are evicted as new failures arrive.
    pub max_retained_failures: i32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            discard_on_success: true,
            max_retained_failures: 100,
        }
    }
}

/// A unit of asynchronous work.
///
/// Created by the store on [`submit`](crate::JobStore::submit); mutated
/// only through the store's claim/report operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Job {
    pub id: Uuid,

    /// Named queue the job was submitted to.
    pub channel: String,
    /// Handler selector, e.g. `"full-refresh"`.
    pub kind: String,
    /// Opaque structured data for the handler.
    pub payload: serde_json::Value,

    pub state: JobState,
    /// 1-based execution attempt. The store never re-drives a job; this
    /// exists so an explicit retry layer can resubmit with attempt + 1.
    pub attempt: i32,

    #[cfg_attr(feature = "postgres", sqlx(flatten))]
    pub retention: RetentionPolicy,

    /// Failure detail recorded by `report_failure`.
    pub error: Option<String>,
    /// Worker id that claimed the job, for diagnostics.
    pub claimed_by: Option<String>,

    pub submitted_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Build a fresh waiting job. Used by store implementations at
    /// submit time; not public API for producers.
    pub(crate) fn submitted(
        channel: &str,
        kind: &str,
        payload: serde_json::Value,
        retention: RetentionPolicy,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.to_string(),
            kind: kind.to_string(),
            payload,
            state: JobState::Waiting,
            attempt: 1,
            retention,
            error: None,
            claimed_by: None,
            submitted_at: Utc::now(),
            claimed_at: None,
            finished_at: None,
        }
    }
}
