//! Conversion workers: take queued jobs, plan, prepare output, run the converter, report.

use crossbeam_channel::Receiver;
use log::{debug, error, info};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use super::context::{WorkItem, WorkerContext};
use super::events::BatchEvent;
use crate::engine::planner::{apply_side_effects, plan_job};
use crate::error::{ConvertError, ConvertResult};
use crate::types::{ConversionJob, JobOutcome};

/// Plan, apply side effects, then run. Nothing is spawned if planning or preparation fails.
pub fn execute_job(job: &ConversionJob, ctx: &WorkerContext) -> ConvertResult<()> {
    debug!(
        "Converting {} into {}",
        job.name,
        ctx.snapshot.format().as_str().to_uppercase()
    );
    let plan = plan_job(job, &ctx.snapshot, &ctx.converter)?;
    apply_side_effects(&plan)?;
    ctx.runner.run(&plan.invocation)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// [`execute_job`], with a panic in the runner turned into that job's failure so the worker
/// keeps serving the queue.
fn execute_job_guarded(job: &ConversionJob, ctx: &WorkerContext) -> ConvertResult<()> {
    panic::catch_unwind(AssertUnwindSafe(|| execute_job(job, ctx))).unwrap_or_else(|payload| {
        Err(ConvertError::RunnerPanicked {
            message: panic_message(payload.as_ref()),
        })
    })
}

/// Single worker: pull items until the queue closes. Send errors mean the caller stopped listening; keep converting anyway.
fn conversion_worker_loop(job_rx: Receiver<WorkItem>, ctx: WorkerContext) {
    while let Ok(item) = job_rx.recv() {
        let WorkItem { id, job, preflight } = item;
        let _ = ctx.event_tx.send(BatchEvent::JobRunning {
            id,
            job: job.clone(),
        });

        let outcome: JobOutcome = match preflight {
            Some(err) => err.into(),
            None => execute_job_guarded(&job, &ctx).into(),
        };
        match &outcome {
            JobOutcome::Success => info!("Converted {} successfully.", job.name),
            JobOutcome::Failure { message, .. } => {
                error!("{} Encountered error: {}", job.name, message)
            }
        }

        let _ = ctx
            .event_tx
            .send(BatchEvent::JobFinished { id, job, outcome });
        if ctx.finish_one() {
            debug!("last job finished");
            let _ = ctx.event_tx.send(BatchEvent::BatchComplete);
        }
    }
}

/// Spawn `num_workers` conversion workers on `job_rx`. Caller must drop its job sender once
/// everything is queued so workers exit.
pub fn spawn_conversion_workers(
    job_rx: Receiver<WorkItem>,
    ctx: &WorkerContext,
    num_workers: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_workers)
        .map(|_| {
            let job_rx = job_rx.clone();
            let ctx = ctx.clone();
            thread::spawn(move || conversion_worker_loop(job_rx, ctx))
        })
        .collect()
}
