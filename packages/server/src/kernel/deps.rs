//! Server dependencies for job handlers (using traits for testability)
//!
//! The dependency container handed to every job handler. External
//! services sit behind trait abstractions so tests can swap in doubles.

use std::sync::Arc;

use crate::kernel::scraper::CatalogScraper;

/// Dependencies accessible to job handlers
#[derive(Clone)]
pub struct ServerDeps {
    /// Performs the full scrape/persist cycle. The worker only sees
    /// success or failure; the cycle itself runs outside this service.
    pub scraper: Arc<dyn CatalogScraper>,
}

impl ServerDeps {
    pub fn new(scraper: Arc<dyn CatalogScraper>) -> Self {
        Self { scraper }
    }
}
