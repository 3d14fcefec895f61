//! Shared fixtures for job queue integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use conveyor::{Job, JobStore, RetentionPolicy, StoreError};
use serde_json::Value;
use tokio::sync::Notify;
use uuid::Uuid;

use server_core::kernel::jobs::{HandlerRegistry, JobWorker, JobWorkerConfig};
use server_core::kernel::scraper::{CatalogScraper, RefreshSummary};
use server_core::kernel::ServerDeps;

/// Fast poll cadence so tests settle quickly.
pub const TEST_POLL: Duration = Duration::from_millis(10);

/// Worker config tuned for tests: tight polling, generous timeout.
pub fn worker_config(worker_id: &str) -> JobWorkerConfig {
    JobWorkerConfig {
        poll_interval: TEST_POLL,
        handler_timeout: Duration::from_secs(5),
        ..JobWorkerConfig::with_worker_id(worker_id)
    }
}

pub fn deps_with(scraper: Arc<dyn CatalogScraper>) -> Arc<ServerDeps> {
    Arc::new(ServerDeps::new(scraper))
}

/// Spawn a worker onto the runtime; returns its shutdown handle.
pub fn spawn_worker(
    store: Arc<dyn JobStore>,
    registry: Arc<HandlerRegistry>,
    deps: Arc<ServerDeps>,
    worker_id: &str,
) -> Arc<AtomicBool> {
    let worker = JobWorker::with_config(store, registry, deps, worker_config(worker_id));
    let shutdown = worker.shutdown_handle();
    tokio::spawn(worker.run());
    shutdown
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_until<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

// =============================================================================
// Mock scrapers
// =============================================================================

/// Succeeds after a fixed delay.
pub struct SlowScraper {
    pub delay: Duration,
}

#[async_trait::async_trait]
impl CatalogScraper for SlowScraper {
    async fn full_refresh(&self) -> Result<RefreshSummary> {
        tokio::time::sleep(self.delay).await;
        Ok(RefreshSummary::default())
    }
}

/// Always fails with a fixed message.
pub struct FailingScraper {
    pub message: &'static str,
}

#[async_trait::async_trait]
impl CatalogScraper for FailingScraper {
    async fn full_refresh(&self) -> Result<RefreshSummary> {
        Err(anyhow!(self.message))
    }
}

/// Signals when a refresh starts, then blocks until released.
#[derive(Default)]
pub struct BlockingScraper {
    pub started: AtomicBool,
    pub release: Notify,
}

#[async_trait::async_trait]
impl CatalogScraper for BlockingScraper {
    async fn full_refresh(&self) -> Result<RefreshSummary> {
        self.started.store(true, Ordering::SeqCst);
        self.release.notified().await;
        Ok(RefreshSummary::default())
    }
}

/// Pops one scripted outcome per call; succeeds once the script runs
/// dry. Counts invocations.
pub struct ScriptedScraper {
    outcomes: Mutex<VecDeque<Result<RefreshSummary, String>>>,
    pub calls: AtomicUsize,
}

impl ScriptedScraper {
    pub fn new(outcomes: Vec<Result<RefreshSummary, String>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl CatalogScraper for ScriptedScraper {
    async fn full_refresh(&self) -> Result<RefreshSummary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.outcomes.lock().unwrap().pop_front();
        match next {
            None | Some(Ok(_)) => Ok(RefreshSummary::default()),
            Some(Err(message)) => Err(anyhow!(message)),
        }
    }
}

// =============================================================================
// Store stub with a dead transport
// =============================================================================

pub struct UnavailableStore;

impl UnavailableStore {
    fn down<T>() -> Result<T, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[async_trait::async_trait]
impl JobStore for UnavailableStore {
    async fn submit(
        &self,
        _channel: &str,
        _kind: &str,
        _payload: Value,
        _retention: RetentionPolicy,
    ) -> Result<Uuid, StoreError> {
        Self::down()
    }

    async fn claim_next(
        &self,
        _channel: &str,
        _worker_id: &str,
    ) -> Result<Option<Job>, StoreError> {
        Self::down()
    }

    async fn report_success(&self, _job_id: Uuid) -> Result<(), StoreError> {
        Self::down()
    }

    async fn report_failure(&self, _job_id: Uuid, _error: &str) -> Result<(), StoreError> {
        Self::down()
    }

    async fn find(&self, _job_id: Uuid) -> Result<Option<Job>, StoreError> {
        Self::down()
    }

    async fn failed_jobs(&self, _channel: &str) -> Result<Vec<Job>, StoreError> {
        Self::down()
    }
}
