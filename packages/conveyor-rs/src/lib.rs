//! # Conveyor
//!
//! A channelled job queue with exclusive claims, terminal-state reporting,
//! and bounded failure retention.
//!
//! ## Core Concepts
//!
//! Conveyor separates **submission** from **execution**:
//! - Producers [`submit`](JobStore::submit) jobs onto a named channel and
//!   return immediately.
//! - Consumers [`claim_next`](JobStore::claim_next) one job at a time; a
//!   claimed job is owned exclusively by its claimer until it reports a
//!   terminal outcome.
//!
//! ## Architecture
//!
//! ```text
//! Producer                          Consumer (one or many)
//!     │                                 │
//!     ▼ submit(channel, kind, ..)       ▼ claim_next(channel, worker_id)
//! ┌─────────────────────────────────────────────┐
//! │                  JobStore                   │
//! │                                             │
//! │   waiting ──► active ──► completed/failed   │
//! │                  ▲             │            │
//! │                  └── report_success /       │
//! │                      report_failure ────────┤
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! 1. **Exclusive claim** - no two callers of `claim_next` receive the
//!    same job; the transition from waiting to active is atomic.
//! 2. **Monotonic state** - waiting → active → {completed | failed}; a
//!    report against a job that is not active is an error.
//! 3. **Bounded retention** - completed jobs are discarded immediately
//!    when their [`RetentionPolicy`] says so; failed jobs are kept up to
//!    a per-job cap, oldest evicted first.
//! 4. **FIFO-ish ordering** - jobs within a channel are claimed in
//!    submission order, but no global ordering is guaranteed once
//!    multiple consumers are active.
//!
//! ## What Conveyor Is Not
//!
//! Conveyor owns interfaces and storage, not policy. Polling cadence,
//! handler dispatch, timeouts, and retry decisions belong in the
//! consumer. A failed job is recorded, never re-driven by the store.
//!
//! ## Backends
//!
//! - [`MemoryJobStore`] - in-process store for tests and development.
//! - `PostgresJobStore` (feature `postgres`) - durable store with
//!   `FOR UPDATE SKIP LOCKED` claiming.

mod error;
mod job;
mod memory;
mod store;

#[cfg(feature = "postgres")]
mod postgres;

pub use error::StoreError;
pub use job::{Job, JobState, RetentionPolicy};
pub use memory::MemoryJobStore;
pub use store::JobStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresJobStore;

// Re-export commonly used external types
pub use async_trait::async_trait;
