//! Producer-facing enqueue gateway.
//!
//! Accepts a refresh request, submits one `full-refresh` job, and
//! acknowledges without waiting for execution. The only failure a
//! caller can see here is the store refusing the submission; everything
//! after that is asynchronous and observable only through the retained
//! failed-job records.

use std::sync::Arc;

use conveyor::{JobStore, RetentionPolicy, StoreError};
use serde::Serialize;
use tracing::info;

use super::{FULL_REFRESH_KIND, SCRAPE_CHANNEL};

/// Synchronous acknowledgement returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct EnqueueAck {
    pub status: String,
}

/// Enqueue gateway for scrape jobs.
pub struct ScrapeService {
    store: Arc<dyn JobStore>,
}

impl ScrapeService {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Queue a full catalog refresh.
    ///
    /// Returns as soon as the store accepts the job - never waits on
    /// the scrape itself. Repeated calls create independent jobs; there
    /// is no deduplication.
    pub async fn enqueue_full_refresh(&self) -> Result<EnqueueAck, StoreError> {
        let job_id = self
            .store
            .submit(
                SCRAPE_CHANNEL,
                FULL_REFRESH_KIND,
                serde_json::json!({}),
                RetentionPolicy {
                    discard_on_success: true,
                    max_retained_failures: 100,
                },
            )
            .await?;

        info!(job_id = %job_id, "full refresh queued");
        Ok(EnqueueAck {
            status: "queued".to_string(),
        })
    }
}
