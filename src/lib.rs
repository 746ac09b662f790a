//! mlvbatch: batch conversion of MLV clips through an external `mlv_dump`, one process per clip
//! on a bounded worker pool.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod settings;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::{ConvertError, FailureKind};
pub use pipeline::{BatchEvent, BatchObserver, BatchOptions, JobId};
pub use settings::{SettingKey, SettingsStore};
pub use types::*;

use log::debug;
use std::sync::Arc;

use crate::engine::runner::ProcessRunner;

/// Result alias used by public mlvbatch API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: convert `jobs` with real converter processes and report each outcome to `observer`.
///
/// - Validation failures (no jobs, bad snapshot, zero concurrency, duplicate jobs) return `Err`
///   holding a [`ConvertError::ConfigurationInvalid`] before anything runs.
/// - Per-clip failures never abort the batch; they are in the returned [`BatchResult`].
///
/// For a custom [`JobRunner`](crate::engine::JobRunner) or an event stream instead of callbacks, use
/// [`pipeline::run_batch`] / [`pipeline::start_batch`].
pub fn convert_batch(
    jobs: Vec<ConversionJob>,
    snapshot: &ConfigSnapshot,
    opts: &BatchOptions,
    observer: &mut dyn BatchObserver,
) -> Result<BatchResult> {
    debug!(
        "{} CONFIG: {:?} {:?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        snapshot,
        opts
    );
    pipeline::run_batch(
        jobs,
        snapshot,
        opts,
        Arc::new(ProcessRunner::default()),
        observer,
    )
}
