//! Scrape trigger and failure-diagnostics routes.

use axum::{extract::Extension, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::kernel::jobs::SCRAPE_CHANNEL;
use crate::server::app::AppState;

/// Trigger a full catalog refresh.
///
/// Responds `202 Accepted` with `{"status":"queued"}` as soon as the
/// job store takes the submission; the refresh itself runs later on a
/// worker. `503` means the store refused the submission.
pub async fn enqueue_refresh_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<Value>) {
    match state.scrape.enqueue_full_refresh().await {
        Ok(ack) => (StatusCode::ACCEPTED, Json(json!(ack))),
        Err(e) => {
            tracing::error!(error = %e, "failed to queue full refresh");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "queue unavailable" })),
            )
        }
    }
}

#[derive(Serialize)]
pub struct FailedJobView {
    pub id: Uuid,
    pub kind: String,
    pub error: Option<String>,
    pub failed_at: Option<DateTime<Utc>>,
}

/// Retained failed-job records, newest first.
///
/// Enqueue acknowledgements carry no outcome, so this bounded history
/// is the place to look when a refresh silently went wrong.
pub async fn scrape_failures_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<Value>) {
    match state.store.failed_jobs(SCRAPE_CHANNEL).await {
        Ok(jobs) => {
            let failures: Vec<FailedJobView> = jobs
                .into_iter()
                .map(|job| FailedJobView {
                    id: job.id,
                    kind: job.kind,
                    error: job.error,
                    failed_at: job.finished_at,
                })
                .collect();
            (StatusCode::OK, Json(json!({ "failures": failures })))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to list scrape failures");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "queue unavailable" })),
            )
        }
    }
}
