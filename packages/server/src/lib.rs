// Catalog Refresh API - Core
//
// Backend service that decouples HTTP-triggered catalog refresh requests
// from the long-running scrape cycle via a durable job queue. The queue
// itself lives in the `conveyor` crate; this crate wires the enqueue
// gateway, the worker loop, and the HTTP surface around it.

pub mod config;
pub mod kernel;
pub mod server;

pub use config::Config;
