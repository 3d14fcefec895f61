//! Job infrastructure for background refresh execution.
//!
//! This module provides the kernel-level pieces around the `conveyor`
//! job store:
//! - [`ScrapeService`] - producer-facing enqueue gateway
//! - [`HandlerRegistry`] - explicit job-kind to handler mapping
//! - [`JobWorker`] - long-running claim/process/report loop
//!
//! # Architecture
//!
//! ```text
//! HTTP route calls ScrapeService.enqueue_full_refresh()
//!     │
//!     └─► JobStore.submit("scrape", "full-refresh", {}, retention)
//!             └─► returns {status: "queued"} immediately
//!
//! JobWorker
//!     │
//!     ├─► JobStore.claim_next("scrape", worker_id)
//!     ├─► HandlerRegistry.dispatch(job) under a timeout
//!     │       └─► CatalogScraper.full_refresh()
//!     └─► report_success / report_failure
//! ```
//!
//! Handlers and their business logic live with their domains (see
//! `kernel::scraper`); this module only provides the infrastructure.

mod error;
mod gateway;
mod registry;
mod worker;

pub use error::DispatchError;
pub use gateway::{EnqueueAck, ScrapeService};
pub use registry::HandlerRegistry;
pub use worker::{JobWorker, JobWorkerConfig};

/// Channel all scrape jobs travel on.
pub const SCRAPE_CHANNEL: &str = "scrape";

/// The one job kind defined today. Additional kinds register their own
/// handlers without touching the worker.
pub const FULL_REFRESH_KIND: &str = "full-refresh";
