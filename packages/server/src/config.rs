use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Base URL of the external scraper service the full-refresh
    /// handler delegates to.
    pub scraper_base_url: String,
    /// Upper bound on one refresh cycle; enforced both on the HTTP
    /// client and by the worker's handler timeout.
    pub scraper_timeout_secs: u64,
    pub worker_poll_interval_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            scraper_base_url: env::var("SCRAPER_BASE_URL")
                .context("SCRAPER_BASE_URL must be set")?,
            scraper_timeout_secs: env::var("SCRAPER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .context("SCRAPER_TIMEOUT_SECS must be a valid number")?,
            worker_poll_interval_ms: env::var("WORKER_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .context("WORKER_POLL_INTERVAL_MS must be a valid number")?,
        })
    }
}
