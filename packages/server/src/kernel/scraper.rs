//! Catalog scraper seam.
//!
//! A full refresh is one external operation from the worker's point of
//! view: fetch the source site, extract headings/categories/products,
//! persist them. All of that happens behind [`CatalogScraper`]; this
//! service only cares whether the cycle succeeded.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::kernel::jobs::{HandlerRegistry, FULL_REFRESH_KIND};

/// Counts reported by a completed refresh cycle. Opaque to the worker;
/// logged for operators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub headings: u64,
    pub categories: u64,
    pub products: u64,
}

/// The pluggable scrape handler invoked by the worker for
/// `full-refresh` jobs.
#[async_trait]
pub trait CatalogScraper: Send + Sync {
    /// Run one full scrape/persist cycle to completion.
    async fn full_refresh(&self) -> Result<RefreshSummary>;
}

/// Client for the external scraper service that owns the actual
/// fetch/extract/persist logic.
pub struct RemoteScraperClient {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteScraperClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create scraper HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CatalogScraper for RemoteScraperClient {
    async fn full_refresh(&self) -> Result<RefreshSummary> {
        let response = self
            .client
            .post(format!("{}/refresh", self.base_url))
            .send()
            .await
            .context("Scraper service unreachable")?
            .error_for_status()
            .context("Scraper service returned an error")?;

        let summary = response
            .json()
            .await
            .context("Invalid refresh summary from scraper service")?;

        Ok(summary)
    }
}

/// Register this domain's job kinds. Called once at startup; the
/// resulting registry is handed to the worker.
pub fn register_scrape_jobs(registry: &mut HandlerRegistry) {
    registry.register(FULL_REFRESH_KIND, |job, deps| async move {
        // Payload is empty today; scope/filter parameters would be
        // parsed from job.payload here.
        let summary = deps.scraper.full_refresh().await?;
        info!(
            job_id = %job.id,
            headings = summary.headings,
            categories = summary.categories,
            products = summary.products,
            "full refresh complete"
        );
        Ok(serde_json::to_value(summary)?)
    });
}
