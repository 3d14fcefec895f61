//! Job worker service for processing scrape jobs.
//!
//! The `JobWorker` is a long-running service that:
//! - Polls the job store for the next claimable job
//! - Dispatches it through the handler registry under a timeout
//! - Reports the outcome back to the store
//!
//! One job is in flight per worker instance; run several instances for
//! throughput - the store guarantees no two of them claim the same job.
//! Handler failures are contained here: they become failed-job records,
//! never a dead worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use conveyor::{Job, JobStore};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::DispatchError;
use super::registry::HandlerRegistry;
use super::SCRAPE_CHANNEL;
use crate::kernel::ServerDeps;

/// Configuration for the job worker.
#[derive(Debug, Clone)]
pub struct JobWorkerConfig {
    /// Channel this worker consumes.
    pub channel: String,
    /// How long to wait when no jobs are available.
    pub poll_interval: Duration,
    /// Upper bound on a single handler execution; exceeding it fails
    /// the job so a stuck handler cannot hold the worker forever.
    pub handler_timeout: Duration,
    /// Worker ID for this instance.
    pub worker_id: String,
}

impl Default for JobWorkerConfig {
    fn default() -> Self {
        Self {
            channel: SCRAPE_CHANNEL.to_string(),
            poll_interval: Duration::from_millis(500),
            handler_timeout: Duration::from_secs(300),
            worker_id: format!("worker-{}", Uuid::new_v4()),
        }
    }
}

impl JobWorkerConfig {
    /// Create a new config with a specific worker ID.
    pub fn with_worker_id(worker_id: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            ..Default::default()
        }
    }
}

/// Background service that claims and executes jobs one at a time.
pub struct JobWorker {
    store: Arc<dyn JobStore>,
    registry: Arc<HandlerRegistry>,
    deps: Arc<ServerDeps>,
    config: JobWorkerConfig,
    shutdown: Arc<AtomicBool>,
}

impl JobWorker {
    /// Create a new job worker with default configuration.
    pub fn new(
        store: Arc<dyn JobStore>,
        registry: Arc<HandlerRegistry>,
        deps: Arc<ServerDeps>,
    ) -> Self {
        Self::with_config(store, registry, deps, JobWorkerConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(
        store: Arc<dyn JobStore>,
        registry: Arc<HandlerRegistry>,
        deps: Arc<ServerDeps>,
        config: JobWorkerConfig,
    ) -> Self {
        Self {
            store,
            registry,
            deps,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a shutdown handle for graceful shutdown.
    ///
    /// Call `store(true, Ordering::SeqCst)` on the returned Arc to
    /// signal shutdown.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Request shutdown of the worker.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Run the worker until shutdown is requested.
    ///
    /// The loop never stops on a per-job failure; claim and report
    /// errors are logged with a short backoff.
    pub async fn run(self) -> Result<()> {
        info!(
            worker_id = %self.config.worker_id,
            channel = %self.config.channel,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "job worker starting"
        );

        loop {
            if self.is_shutdown_requested() {
                break;
            }

            let claimed = self
                .store
                .claim_next(&self.config.channel, &self.config.worker_id)
                .await;

            match claimed {
                Ok(Some(job)) => self.process_job(job).await,
                Ok(None) => {
                    // Channel empty; wait before the next poll.
                    tokio::time::sleep(self.config.poll_interval).await;
                }
                Err(e) => {
                    error!(error = %e, "failed to claim job");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }

        info!(worker_id = %self.config.worker_id, "job worker stopped");
        Ok(())
    }

    /// Run until a shutdown signal is received.
    ///
    /// Convenience method that listens for Ctrl+C.
    pub async fn run_until_shutdown(self) -> Result<()> {
        let shutdown = self.shutdown_handle();

        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("received shutdown signal");
            shutdown.store(true, Ordering::SeqCst);
        });

        self.run().await
    }

    /// Execute one claimed job and report its outcome.
    async fn process_job(&self, job: Job) {
        let job_id = job.id;
        let kind = job.kind.clone();

        debug!(job_id = %job_id, kind = %kind, "executing job");

        let result = match tokio::time::timeout(
            self.config.handler_timeout,
            self.registry.dispatch(job, self.deps.clone()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout(self.config.handler_timeout)),
        };

        match result {
            Ok(outcome) => {
                info!(job_id = %job_id, kind = %kind, "job succeeded");
                debug!(job_id = %job_id, outcome = %outcome, "handler outcome");
                if let Err(e) = self.store.report_success(job_id).await {
                    error!(job_id = %job_id, error = %e, "failed to mark job as succeeded");
                }
            }
            Err(e) => {
                warn!(job_id = %job_id, kind = %kind, error = %e, "job failed");
                if let Err(mark_err) = self.store.report_failure(job_id, &e.to_string()).await {
                    error!(job_id = %job_id, error = %mark_err, "failed to mark job as failed");
                }
            }
        }
    }
}
