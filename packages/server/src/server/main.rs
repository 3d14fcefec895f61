// Main entry point for the catalog refresh API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use conveyor::{JobStore, PostgresJobStore};
use server_core::kernel::jobs::{HandlerRegistry, JobWorker, JobWorkerConfig};
use server_core::kernel::scraper::{register_scrape_jobs, RemoteScraperClient};
use server_core::kernel::ServerDeps;
use server_core::server::build_app;
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,conveyor=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Catalog Refresh API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Durable job store shared by the gateway and the worker
    let store: Arc<dyn JobStore> = Arc::new(PostgresJobStore::new(pool));

    // External scraper service client
    let scraper_timeout = Duration::from_secs(config.scraper_timeout_secs);
    let scraper = RemoteScraperClient::new(config.scraper_base_url.clone(), scraper_timeout)
        .context("Failed to create scraper client")?;
    let deps = Arc::new(ServerDeps::new(Arc::new(scraper)));

    // Explicit handler registration, once, at startup
    let mut registry = HandlerRegistry::new();
    register_scrape_jobs(&mut registry);

    // Spawn the worker loop
    let worker_config = JobWorkerConfig {
        poll_interval: Duration::from_millis(config.worker_poll_interval_ms),
        handler_timeout: scraper_timeout,
        ..Default::default()
    };
    let worker = JobWorker::with_config(store.clone(), Arc::new(registry), deps, worker_config);
    tokio::spawn(worker.run_until_shutdown());

    // Build application
    let app = build_app(store);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
