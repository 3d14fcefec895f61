//! PostgreSQL-backed job store.
//!
//! Durable backend: a submitted job survives the submitting process.
//! Claiming uses `FOR UPDATE SKIP LOCKED` so concurrent workers never
//! receive the same row. Expects the `jobs` table and `job_state` enum
//! from the service's migrations.

use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::job::{Job, JobState, RetentionPolicy};
use crate::store::JobStore;

const JOB_COLUMNS: &str = "id, channel, kind, payload, state, attempt, \
     discard_on_success, max_retained_failures, error, claimed_by, \
     submitted_at, claimed_at, finished_at";

pub struct PostgresJobStore {
    pool: PgPool,
}

impl PostgresJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, job_id: Uuid) -> Result<Option<Job>, StoreError> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE id = $1",
            JOB_COLUMNS
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    /// Load an active job or fail with the precise reason.
    async fn fetch_active(&self, job_id: Uuid) -> Result<Job, StoreError> {
        match self.fetch(job_id).await? {
            None => Err(StoreError::NotFound(job_id)),
            Some(job) if job.state != JobState::Active => Err(StoreError::NotActive {
                id: job_id,
                state: job.state,
            }),
            Some(job) => Ok(job),
        }
    }

    /// Evict failed records beyond the channel's retention cap, oldest
    /// first.
    async fn prune_failed(&self, channel: &str, cap: i32) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            DELETE FROM jobs
            WHERE channel = $1
              AND state = 'failed'
              AND id NOT IN (
                  SELECT id FROM jobs
                  WHERE channel = $1 AND state = 'failed'
                  ORDER BY finished_at DESC, id DESC
                  LIMIT $2
              )
            "#,
        )
        .bind(channel)
        .bind(cap.max(0) as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl JobStore for PostgresJobStore {
    async fn submit(
        &self,
        channel: &str,
        kind: &str,
        payload: Value,
        retention: RetentionPolicy,
    ) -> Result<Uuid, StoreError> {
        let job = Job::submitted(channel, kind, payload, retention);

        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, channel, kind, payload, state, attempt,
                discard_on_success, max_retained_failures, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(job.id)
        .bind(&job.channel)
        .bind(&job.kind)
        .bind(&job.payload)
        .bind(job.state)
        .bind(job.attempt)
        .bind(job.retention.discard_on_success)
        .bind(job.retention.max_retained_failures)
        .bind(job.submitted_at)
        .execute(&self.pool)
        .await?;

        debug!(job_id = %job.id, channel = %channel, kind = %kind, "job submitted");
        Ok(job.id)
    }

    async fn claim_next(
        &self,
        channel: &str,
        worker_id: &str,
    ) -> Result<Option<Job>, StoreError> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            WITH next_job AS (
                SELECT id FROM jobs
                WHERE channel = $1 AND state = 'waiting'
                ORDER BY submitted_at, id
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE jobs
            SET state = 'active',
                claimed_by = $2,
                claimed_at = NOW()
            WHERE id IN (SELECT id FROM next_job)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(channel)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(ref job) = job {
            debug!(job_id = %job.id, channel = %channel, worker_id = %worker_id, "job claimed");
        }
        Ok(job)
    }

    async fn report_success(&self, job_id: Uuid) -> Result<(), StoreError> {
        let job = self.fetch_active(job_id).await?;

        if job.retention.discard_on_success {
            sqlx::query("DELETE FROM jobs WHERE id = $1")
                .bind(job_id)
                .execute(&self.pool)
                .await?;
        } else {
            sqlx::query(
                "UPDATE jobs SET state = 'completed', finished_at = NOW() WHERE id = $1",
            )
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    async fn report_failure(&self, job_id: Uuid, error: &str) -> Result<(), StoreError> {
        let job = self.fetch_active(job_id).await?;

        sqlx::query(
            "UPDATE jobs SET state = 'failed', error = $1, finished_at = NOW() WHERE id = $2",
        )
        .bind(error)
        .bind(job_id)
        .execute(&self.pool)
        .await?;

        self.prune_failed(&job.channel, job.retention.max_retained_failures)
            .await
    }

    async fn find(&self, job_id: Uuid) -> Result<Option<Job>, StoreError> {
        self.fetch(job_id).await
    }

    async fn failed_jobs(&self, channel: &str) -> Result<Vec<Job>, StoreError> {
        let jobs = sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {} FROM jobs
            WHERE channel = $1 AND state = 'failed'
            ORDER BY finished_at DESC, id DESC
            "#,
            JOB_COLUMNS
        ))
        .bind(channel)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }
}
