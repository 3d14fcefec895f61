//! Handler registry: explicit mapping from job kind to handler.
//!
//! Each domain registers its kinds at startup and the finished registry
//! is passed to the worker. Registration is a plain map insert - no
//! reflection, no attribute scanning.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use conveyor::Job;

use super::error::DispatchError;
use crate::kernel::ServerDeps;

/// Type alias for the async handler function.
///
/// Handlers receive the claimed job (`id`, `kind`, `payload`) and the
/// dependency container. The returned value is opaque to the worker;
/// only success or failure matters.
type BoxedHandler = Box<
    dyn Fn(Job, Arc<ServerDeps>) -> Pin<Box<dyn Future<Output = Result<serde_json::Value>> + Send>>
        + Send
        + Sync,
>;

/// Registry that maps job kind strings to handlers.
///
/// # Example
///
/// ```ignore
/// let mut registry = HandlerRegistry::new();
/// registry.register("full-refresh", |job, deps| async move {
///     let summary = deps.scraper.full_refresh().await?;
///     Ok(serde_json::to_value(summary)?)
/// });
///
/// // Later, in the worker
/// registry.dispatch(claimed_job, deps.clone()).await?;
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<&'static str, BoxedHandler>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a job kind.
    ///
    /// # Panics
    ///
    /// Panics if the kind is already registered; duplicate registration
    /// is a wiring bug, caught at startup.
    pub fn register<F, Fut>(&mut self, kind: &'static str, handler: F)
    where
        F: Fn(Job, Arc<ServerDeps>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value>> + Send + 'static,
    {
        let boxed: BoxedHandler = Box::new(move |job, deps| Box::pin(handler(job, deps)));
        if self.handlers.insert(kind, boxed).is_some() {
            panic!("handler already registered for job kind: {}", kind);
        }
    }

    /// Execute the handler registered for a claimed job's kind.
    ///
    /// An unregistered kind fails with [`DispatchError::UnknownKind`]
    /// before any handler runs.
    pub async fn dispatch(
        &self,
        job: Job,
        deps: Arc<ServerDeps>,
    ) -> Result<serde_json::Value, DispatchError> {
        let handler = self
            .handlers
            .get(job.kind.as_str())
            .ok_or_else(|| DispatchError::UnknownKind(job.kind.clone()))?;

        handler(job, deps).await.map_err(DispatchError::Handler)
    }

    /// Check if a job kind is registered.
    pub fn is_registered(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// All registered job kinds.
    pub fn registered_kinds(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }
}
