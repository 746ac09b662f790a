//! Batch context: shared state handed to each worker, and the channels tying workers to the caller.

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::events::{BatchEvent, JobId};
use crate::engine::runner::JobRunner;
use crate::error::ConvertError;
use crate::types::{ConfigSnapshot, ConversionJob};

/// Caller-provided batch parameters besides jobs and snapshot.
#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Converter executable.
    pub converter: PathBuf,
    /// Max jobs running at once. Must be at least 1.
    pub concurrency: usize,
}

impl BatchOptions {
    pub fn new(converter: impl Into<PathBuf>, concurrency: usize) -> Self {
        Self {
            converter: converter.into(),
            concurrency,
        }
    }
}

/// A queued job. `preflight` holds an error found before dispatch; the worker reports it without running anything.
pub struct WorkItem {
    pub id: JobId,
    pub job: ConversionJob,
    pub preflight: Option<ConvertError>,
}

/// Read-only state shared by all workers of one batch.
#[derive(Clone)]
pub struct WorkerContext {
    pub snapshot: Arc<ConfigSnapshot>,
    pub converter: Arc<PathBuf>,
    pub runner: Arc<dyn JobRunner>,
    pub event_tx: Sender<BatchEvent>,
    /// Jobs not yet finished. The worker that takes it to zero emits `BatchComplete`.
    pub remaining: Arc<AtomicUsize>,
}

impl WorkerContext {
    /// Mark one job finished; true if it was the last.
    pub fn finish_one(&self) -> bool {
        self.remaining.fetch_sub(1, Ordering::AcqRel) == 1
    }
}

/// Channels for one batch. Job queue capacity is the batch size so submission never blocks.
pub struct BatchChannels {
    pub job_tx: Sender<WorkItem>,
    pub job_rx: Receiver<WorkItem>,
    pub event_tx: Sender<BatchEvent>,
    pub event_rx: Receiver<BatchEvent>,
}

pub fn create_batch_channels(total: usize) -> BatchChannels {
    let (job_tx, job_rx) = bounded::<WorkItem>(total.max(1));
    let (event_tx, event_rx) = unbounded::<BatchEvent>();
    BatchChannels {
        job_tx,
        job_rx,
        event_tx,
        event_rx,
    }
}
