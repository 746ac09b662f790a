//! Batch pipeline: job queue, worker pool, event stream.

pub mod context;
pub mod events;
pub mod orchestrator;
pub mod worker;

pub use context::{BatchChannels, BatchOptions, WorkItem, WorkerContext, create_batch_channels};
pub use events::{BatchEvent, BatchObserver, JobId, NoopObserver};
pub use orchestrator::{BatchHandles, run_batch, shutdown_workers, start_batch, validate_batch};
pub use worker::{execute_job, spawn_conversion_workers};
