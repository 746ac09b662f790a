use anyhow::Result;
use crossbeam_channel::Receiver;
use log::debug;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::thread::JoinHandle;

use crate::engine::planner::output_target;
use crate::engine::runner::JobRunner;
use crate::error::ConvertError;
use crate::pipeline::{
    BatchEvent, BatchObserver, BatchOptions, JobId, WorkItem, WorkerContext,
    create_batch_channels, spawn_conversion_workers,
};
use crate::types::{BatchResult, ConfigSnapshot, ConversionJob};

/// A dispatched batch. Consume `events` directly, or hand the whole thing to [`BatchHandles::wait`].
pub struct BatchHandles {
    pub events: Receiver<BatchEvent>,
    pub worker_handles: Vec<JoinHandle<()>>,
    pub total: usize,
}

impl BatchHandles {
    /// Drain events into `observer` until the batch completes, join workers, return every outcome.
    pub fn wait(self, observer: &mut dyn BatchObserver) -> Result<BatchResult> {
        let BatchHandles {
            events,
            worker_handles,
            total,
        } = self;

        let mut result = BatchResult::default();
        let mut complete = false;
        for event in events.iter() {
            match event {
                BatchEvent::JobStarted { job, .. } => observer.on_job_started(&job),
                BatchEvent::JobRunning { job, .. } => observer.on_job_running(&job),
                BatchEvent::JobFinished { job, outcome, .. } => {
                    observer.on_job_finished(&job, &outcome);
                    result.record(job, outcome);
                }
                BatchEvent::BatchComplete => {
                    complete = true;
                    observer.on_batch_complete(&result);
                    break;
                }
            }
        }

        shutdown_workers(worker_handles)?;
        if !complete || result.len() != total {
            anyhow::bail!(
                "batch ended with {} of {} jobs reported",
                result.len(),
                total
            );
        }
        Ok(result)
    }
}

/// Join worker threads (after the queue has drained).
pub fn shutdown_workers(worker_handles: Vec<JoinHandle<()>>) -> Result<()> {
    let mut panicked = 0;
    for h in worker_handles {
        if h.join().is_err() {
            panicked += 1;
        }
    }
    if panicked > 0 {
        anyhow::bail!("{} conversion worker thread(s) panicked", panicked);
    }
    Ok(())
}

/// Batch-level checks. Any failure here means nothing is dispatched and no event is emitted.
pub fn validate_batch(
    jobs: &[ConversionJob],
    snapshot: &ConfigSnapshot,
    opts: &BatchOptions,
) -> Result<(), ConvertError> {
    snapshot.validate()?;
    if jobs.is_empty() {
        return Err(ConvertError::invalid("no files selected for conversion"));
    }
    if opts.concurrency == 0 {
        return Err(ConvertError::invalid("concurrency must be at least 1"));
    }
    if opts.converter.as_os_str().is_empty() {
        return Err(ConvertError::invalid("converter path is not set"));
    }
    let mut seen = HashSet::with_capacity(jobs.len());
    for job in jobs {
        if !seen.insert(job) {
            return Err(ConvertError::invalid(format!(
                "{} ({}) is queued twice",
                job.name,
                job.source.display()
            )));
        }
    }
    Ok(())
}

/// Reserve the job's output target. `claimed` starts out holding every source in the batch, so a
/// target that is a source file (e.g. `clip.mlv` written into its own directory as RAW) or that an
/// earlier job already claimed fails without running.
fn claim_target(
    job: &ConversionJob,
    snapshot: &ConfigSnapshot,
    claimed: &mut HashSet<PathBuf>,
) -> Option<ConvertError> {
    match output_target(job, snapshot) {
        Ok(target) if claimed.contains(&target) => {
            debug!(
                "{} maps to {}, already a source or output in this batch",
                job.name,
                target.display()
            );
            Some(ConvertError::OutputCollision { path: target })
        }
        Ok(target) => {
            claimed.insert(target);
            None
        }
        Err(e) => Some(e),
    }
}

/// Validate, emit `JobStarted` for every job, and dispatch them to a pool of
/// `min(concurrency, jobs)` workers. Returns as soon as everything is queued.
///
/// The snapshot is copied; later changes to the caller's settings are never seen by the batch.
pub fn start_batch(
    jobs: Vec<ConversionJob>,
    snapshot: &ConfigSnapshot,
    opts: &BatchOptions,
    runner: Arc<dyn JobRunner>,
) -> Result<BatchHandles> {
    validate_batch(&jobs, snapshot, opts)?;

    let total = jobs.len();
    let num_workers = opts.concurrency.min(total);
    debug!("Dispatching {} jobs on {} workers", total, num_workers);

    let channels = create_batch_channels(total);
    let ctx = WorkerContext {
        snapshot: Arc::new(snapshot.clone()),
        converter: Arc::new(opts.converter.clone()),
        runner,
        event_tx: channels.event_tx.clone(),
        remaining: Arc::new(AtomicUsize::new(total)),
    };
    let worker_handles = spawn_conversion_workers(channels.job_rx, &ctx, num_workers);
    // Workers hold the only event senders from here on.
    drop(ctx);

    let mut claimed: HashSet<PathBuf> = jobs.iter().map(|j| j.source.clone()).collect();
    for (i, job) in jobs.into_iter().enumerate() {
        let id = JobId(i);
        let _ = channels.event_tx.send(BatchEvent::JobStarted {
            id,
            job: job.clone(),
        });
        let preflight = claim_target(&job, snapshot, &mut claimed);
        channels
            .job_tx
            .send(WorkItem { id, job, preflight })
            .map_err(|_| anyhow::anyhow!("conversion workers exited before the batch was queued"))?;
    }
    // Dropping the last job sender closes the queue so workers exit when it drains.
    drop(channels.job_tx);
    drop(channels.event_tx);

    Ok(BatchHandles {
        events: channels.event_rx,
        worker_handles,
        total,
    })
}

/// Run a whole batch: dispatch, report every job to `observer` as it finishes, and return once
/// all jobs are terminal. Per-job failures are outcomes; only validation errors (as
/// [`ConvertError`]) or a panicked worker make this return `Err`.
pub fn run_batch(
    jobs: Vec<ConversionJob>,
    snapshot: &ConfigSnapshot,
    opts: &BatchOptions,
    runner: Arc<dyn JobRunner>,
    observer: &mut dyn BatchObserver,
) -> Result<BatchResult> {
    start_batch(jobs, snapshot, opts, runner)?.wait(observer)
}
