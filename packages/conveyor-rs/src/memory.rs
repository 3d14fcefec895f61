//! In-process job store for tests and development.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::job::{Job, JobState, RetentionPolicy};
use crate::store::JobStore;

/// Per-channel queue state. `waiting` is claimed front-to-back;
/// `failed` keeps oldest records at the front so eviction is a
/// `pop_front`.
#[derive(Default)]
struct ChannelState {
    waiting: VecDeque<Job>,
    active: HashMap<Uuid, Job>,
    completed: HashMap<Uuid, Job>,
    failed: VecDeque<Job>,
}

impl ChannelState {
    fn state_of(&self, job_id: Uuid) -> Option<JobState> {
        if self.waiting.iter().any(|j| j.id == job_id) {
            Some(JobState::Waiting)
        } else if self.active.contains_key(&job_id) {
            Some(JobState::Active)
        } else if self.completed.contains_key(&job_id) {
            Some(JobState::Completed)
        } else if self.failed.iter().any(|j| j.id == job_id) {
            Some(JobState::Failed)
        } else {
            None
        }
    }

    fn get(&self, job_id: Uuid) -> Option<&Job> {
        self.waiting
            .iter()
            .find(|j| j.id == job_id)
            .or_else(|| self.active.get(&job_id))
            .or_else(|| self.completed.get(&job_id))
            .or_else(|| self.failed.iter().find(|j| j.id == job_id))
    }
}

/// In-memory [`JobStore`].
///
/// Provides the full contract - atomic claims, monotonic transitions,
/// retention enforcement - behind a single async mutex, but is **not
/// durable**: jobs die with the process. Use it in tests and local
/// development; production deployments use the `postgres` backend.
#[derive(Default)]
pub struct MemoryJobStore {
    channels: Mutex<HashMap<String, ChannelState>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs waiting on a channel. Test/diagnostic helper.
    pub async fn waiting_len(&self, channel: &str) -> usize {
        let channels = self.channels.lock().await;
        channels.get(channel).map_or(0, |c| c.waiting.len())
    }

    /// Number of claimed-but-unreported jobs on a channel.
    pub async fn active_len(&self, channel: &str) -> usize {
        let channels = self.channels.lock().await;
        channels.get(channel).map_or(0, |c| c.active.len())
    }
}

#[async_trait::async_trait]
impl JobStore for MemoryJobStore {
    async fn submit(
        &self,
        channel: &str,
        kind: &str,
        payload: Value,
        retention: RetentionPolicy,
    ) -> Result<Uuid, StoreError> {
        let job = Job::submitted(channel, kind, payload, retention);
        let job_id = job.id;

        let mut channels = self.channels.lock().await;
        channels
            .entry(channel.to_string())
            .or_default()
            .waiting
            .push_back(job);

        debug!(job_id = %job_id, channel = %channel, kind = %kind, "job submitted");
        Ok(job_id)
    }

    async fn claim_next(
        &self,
        channel: &str,
        worker_id: &str,
    ) -> Result<Option<Job>, StoreError> {
        let mut channels = self.channels.lock().await;
        let Some(state) = channels.get_mut(channel) else {
            return Ok(None);
        };

        let Some(mut job) = state.waiting.pop_front() else {
            return Ok(None);
        };

        job.state = JobState::Active;
        job.claimed_by = Some(worker_id.to_string());
        job.claimed_at = Some(chrono::Utc::now());
        state.active.insert(job.id, job.clone());

        debug!(job_id = %job.id, channel = %channel, worker_id = %worker_id, "job claimed");
        Ok(Some(job))
    }

    async fn report_success(&self, job_id: Uuid) -> Result<(), StoreError> {
        let mut channels = self.channels.lock().await;

        for state in channels.values_mut() {
            if let Some(mut job) = state.active.remove(&job_id) {
                if !job.retention.discard_on_success {
                    job.state = JobState::Completed;
                    job.finished_at = Some(chrono::Utc::now());
                    state.completed.insert(job.id, job);
                }
                return Ok(());
            }
            if let Some(found) = state.state_of(job_id) {
                return Err(StoreError::NotActive {
                    id: job_id,
                    state: found,
                });
            }
        }

        Err(StoreError::NotFound(job_id))
    }

    async fn report_failure(&self, job_id: Uuid, error: &str) -> Result<(), StoreError> {
        let mut channels = self.channels.lock().await;

        for state in channels.values_mut() {
            if let Some(mut job) = state.active.remove(&job_id) {
                job.state = JobState::Failed;
                job.error = Some(error.to_string());
                job.finished_at = Some(chrono::Utc::now());

                let cap = job.retention.max_retained_failures.max(0) as usize;
                state.failed.push_back(job);
                while state.failed.len() > cap {
                    state.failed.pop_front();
                }
                return Ok(());
            }
            if let Some(found) = state.state_of(job_id) {
                return Err(StoreError::NotActive {
                    id: job_id,
                    state: found,
                });
            }
        }

        Err(StoreError::NotFound(job_id))
    }

    async fn find(&self, job_id: Uuid) -> Result<Option<Job>, StoreError> {
        let channels = self.channels.lock().await;
        for state in channels.values() {
            if let Some(job) = state.get(job_id) {
                return Ok(Some(job.clone()));
            }
        }
        Ok(None)
    }

    async fn failed_jobs(&self, channel: &str) -> Result<Vec<Job>, StoreError> {
        let channels = self.channels.lock().await;
        let Some(state) = channels.get(channel) else {
            return Ok(Vec::new());
        };
        Ok(state.failed.iter().rev().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    const CHANNEL: &str = "scrape";

    async fn submit_one(store: &MemoryJobStore) -> Uuid {
        store
            .submit(
                CHANNEL,
                "full-refresh",
                serde_json::json!({}),
                RetentionPolicy::default(),
            )
            .await
            .expect("submit failed")
    }

    #[tokio::test]
    async fn claim_returns_none_on_empty_channel() {
        let store = MemoryJobStore::new();
        let claimed = store.claim_next(CHANNEL, "w1").await.unwrap();
        assert!(claimed.is_none());
    }

    #[tokio::test]
    async fn claim_transitions_waiting_to_active() {
        let store = MemoryJobStore::new();
        let job_id = submit_one(&store).await;

        let job = store.claim_next(CHANNEL, "w1").await.unwrap().unwrap();
        assert_eq!(job.id, job_id);
        assert_eq!(job.state, JobState::Active);
        assert_eq!(job.claimed_by.as_deref(), Some("w1"));
        assert!(job.claimed_at.is_some());

        // Nothing left to claim
        assert!(store.claim_next(CHANNEL, "w2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn claims_come_out_in_submission_order() {
        let store = MemoryJobStore::new();
        let first = submit_one(&store).await;
        let second = submit_one(&store).await;
        let third = submit_one(&store).await;

        for expected in [first, second, third] {
            let job = store.claim_next(CHANNEL, "w1").await.unwrap().unwrap();
            assert_eq!(job.id, expected);
            store.report_success(job.id).await.unwrap();
        }
    }

    #[tokio::test]
    async fn success_with_discard_removes_the_record() {
        let store = MemoryJobStore::new();
        let job_id = submit_one(&store).await;
        store.claim_next(CHANNEL, "w1").await.unwrap().unwrap();

        store.report_success(job_id).await.unwrap();
        assert!(store.find(job_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn success_without_discard_keeps_a_completed_record() {
        let store = MemoryJobStore::new();
        let job_id = store
            .submit(
                CHANNEL,
                "full-refresh",
                serde_json::json!({}),
                RetentionPolicy {
                    discard_on_success: false,
                    max_retained_failures: 100,
                },
            )
            .await
            .unwrap();
        store.claim_next(CHANNEL, "w1").await.unwrap().unwrap();
        store.report_success(job_id).await.unwrap();

        let job = store.find(job_id).await.unwrap().unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert!(job.finished_at.is_some());
    }

    #[tokio::test]
    async fn failure_records_error_detail() {
        let store = MemoryJobStore::new();
        let job_id = submit_one(&store).await;
        store.claim_next(CHANNEL, "w1").await.unwrap().unwrap();

        store.report_failure(job_id, "network timeout").await.unwrap();

        let job = store.find(job_id).await.unwrap().unwrap();
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.error.as_deref(), Some("network timeout"));

        let failed = store.failed_jobs(CHANNEL).await.unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, job_id);
    }

    #[tokio::test]
    async fn failed_history_is_bounded_oldest_evicted_first() {
        let store = MemoryJobStore::new();
        let retention = RetentionPolicy {
            discard_on_success: true,
            max_retained_failures: 3,
        };

        let mut ids = Vec::new();
        for _ in 0..5 {
            let id = store
                .submit(CHANNEL, "full-refresh", serde_json::json!({}), retention)
                .await
                .unwrap();
            store.claim_next(CHANNEL, "w1").await.unwrap().unwrap();
            store.report_failure(id, "boom").await.unwrap();
            ids.push(id);
        }

        let failed = store.failed_jobs(CHANNEL).await.unwrap();
        assert_eq!(failed.len(), 3);

        // Newest first: ids[4], ids[3], ids[2]; ids[0] and ids[1] evicted.
        let retained: Vec<Uuid> = failed.iter().map(|j| j.id).collect();
        assert_eq!(retained, vec![ids[4], ids[3], ids[2]]);
        assert!(store.find(ids[0]).await.unwrap().is_none());
        assert!(store.find(ids[1]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reporting_an_unclaimed_job_is_rejected() {
        let store = MemoryJobStore::new();
        let job_id = submit_one(&store).await;

        let err = store.report_success(job_id).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotActive {
                state: JobState::Waiting,
                ..
            }
        ));

        let err = store.report_failure(job_id, "boom").await.unwrap_err();
        assert!(matches!(err, StoreError::NotActive { .. }));
    }

    #[tokio::test]
    async fn reporting_an_unknown_job_is_not_found() {
        let store = MemoryJobStore::new();
        let err = store.report_success(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn double_success_report_is_rejected() {
        let store = MemoryJobStore::new();
        let job_id = submit_one(&store).await;
        store.claim_next(CHANNEL, "w1").await.unwrap().unwrap();
        store.report_success(job_id).await.unwrap();

        // Record discarded on the first report
        let err = store.report_success(job_id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn channels_are_isolated() {
        let store = MemoryJobStore::new();
        submit_one(&store).await;

        assert!(store.claim_next("other", "w1").await.unwrap().is_none());
        assert_eq!(store.waiting_len(CHANNEL).await, 1);
        assert!(store.failed_jobs("other").await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_claimers_never_share_a_job() {
        let store = Arc::new(MemoryJobStore::new());

        let mut submitted = HashSet::new();
        for _ in 0..100 {
            submitted.insert(submit_one(&store).await);
        }

        let mut handles = Vec::new();
        for w in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let worker_id = format!("w{}", w);
                let mut claimed = Vec::new();
                while let Some(job) = store.claim_next(CHANNEL, &worker_id).await.unwrap() {
                    claimed.push(job.id);
                }
                claimed
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.await.unwrap() {
                assert!(seen.insert(id), "job {} claimed twice", id);
            }
        }
        assert_eq!(seen, submitted);
    }
}
