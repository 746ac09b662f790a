//! Typed batch events and the observer that consumes them.

use std::fmt;

use crate::types::{BatchResult, ConversionJob, JobOutcome, JobState};

/// Position of a job in its batch (submission order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub usize);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Events emitted by a running batch, in the order they happen.
///
/// For any one job, `JobStarted` precedes `JobRunning` precedes `JobFinished`. Across jobs,
/// `JobFinished` arrives in completion order. `BatchComplete` is always last.
#[derive(Clone, Debug)]
pub enum BatchEvent {
    JobStarted { id: JobId, job: ConversionJob },
    JobRunning { id: JobId, job: ConversionJob },
    JobFinished {
        id: JobId,
        job: ConversionJob,
        outcome: JobOutcome,
    },
    BatchComplete,
}

impl BatchEvent {
    /// State the job moves into with this event; `None` for [`BatchEvent::BatchComplete`].
    pub fn state(&self) -> Option<JobState> {
        match self {
            BatchEvent::JobStarted { .. } => Some(JobState::Pending),
            BatchEvent::JobRunning { .. } => Some(JobState::Running),
            BatchEvent::JobFinished { outcome, .. } => Some(JobState::from(outcome)),
            BatchEvent::BatchComplete => None,
        }
    }
}

/// Receives batch progress on the thread that drains the batch. Every method but
/// `on_job_finished` is optional.
pub trait BatchObserver {
    /// Job accepted into the batch (pending).
    fn on_job_started(&mut self, _job: &ConversionJob) {}

    /// A worker picked the job up.
    fn on_job_running(&mut self, _job: &ConversionJob) {}

    /// Called exactly once per job, in completion order.
    fn on_job_finished(&mut self, job: &ConversionJob, outcome: &JobOutcome);

    /// Called once after every job has finished, however many failed.
    fn on_batch_complete(&mut self, _result: &BatchResult) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {
    fn on_job_finished(&mut self, _job: &ConversionJob, _outcome: &JobOutcome) {}
}
