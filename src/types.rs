//! Public types for the mlvbatch API: jobs, configuration snapshot, outcomes.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ConvertError, ConvertResult, FailureKind};

/// One input file queued for conversion. Identity is `(name, source)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversionJob {
    /// Display name, normally the source file name (e.g. `clip1.MLV`).
    pub name: String,
    /// Absolute path of the source file.
    pub source: PathBuf,
}

impl ConversionJob {
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Build a job from a path, using the file name as display name. `None` when the path has no
    /// file name or the name is not valid UTF-8 (the output name must match it exactly).
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        Some(Self::new(name, path))
    }
}

impl fmt::Display for ConversionJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Converter output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// One directory per clip holding a DNG sequence.
    #[default]
    Dng,
    /// A single legacy `.raw` file per clip.
    Raw,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Dng => "dng",
            OutputFormat::Raw => "raw",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dng" => Ok(OutputFormat::Dng),
            "raw" => Ok(OutputFormat::Raw),
            "" => Err(ConvertError::invalid("output format is not set")),
            other => Err(ConvertError::invalid(format!(
                "unknown output format '{other}' (expected dng or raw)"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chroma smoothing level passed to the converter. Only meaningful for [`OutputFormat::Dng`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChromaSmoothing {
    #[default]
    None,
    TwoByTwo,
    ThreeByThree,
    FiveByFive,
}

impl ChromaSmoothing {
    /// Level as stored in settings; empty for none.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChromaSmoothing::None => "",
            ChromaSmoothing::TwoByTwo => "2x2",
            ChromaSmoothing::ThreeByThree => "3x3",
            ChromaSmoothing::FiveByFive => "5x5",
        }
    }

    /// Converter flag (`--cs3x3`), or `None` when smoothing is off.
    pub fn flag(&self) -> Option<String> {
        match self {
            ChromaSmoothing::None => None,
            level => Some(format!("--cs{}", level.as_str())),
        }
    }
}

impl FromStr for ChromaSmoothing {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(ChromaSmoothing::None),
            "2x2" => Ok(ChromaSmoothing::TwoByTwo),
            "3x3" => Ok(ChromaSmoothing::ThreeByThree),
            "5x5" => Ok(ChromaSmoothing::FiveByFive),
            other => Err(ConvertError::invalid(format!(
                "unknown chroma smoothing '{other}' (expected none, 2x2, 3x3 or 5x5)"
            ))),
        }
    }
}

impl fmt::Display for ChromaSmoothing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChromaSmoothing::None => f.write_str("none"),
            level => f.write_str(level.as_str()),
        }
    }
}

/// Immutable copy of the settings a batch runs with. Taken once at batch start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigSnapshot {
    format: OutputFormat,
    output_dir: PathBuf,
    smoothing: ChromaSmoothing,
}

impl ConfigSnapshot {
    /// Build a snapshot. Fails with `ConfigurationInvalid` when `output_dir` is empty or relative.
    pub fn new(
        format: OutputFormat,
        output_dir: impl Into<PathBuf>,
        smoothing: ChromaSmoothing,
    ) -> ConvertResult<Self> {
        let snapshot = Self {
            format,
            output_dir: output_dir.into(),
            smoothing,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Parse a snapshot from raw setting strings.
    pub fn parse(format: &str, output_dir: &str, smoothing: &str) -> ConvertResult<Self> {
        if output_dir.trim().is_empty() {
            return Err(ConvertError::invalid("output directory is not set"));
        }
        Self::new(format.parse()?, output_dir.trim(), smoothing.parse()?)
    }

    pub fn validate(&self) -> ConvertResult<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConvertError::invalid("output directory is not set"));
        }
        if !self.output_dir.is_absolute() {
            return Err(ConvertError::invalid(format!(
                "output directory must be absolute: {}",
                self.output_dir.display()
            )));
        }
        Ok(())
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn smoothing(&self) -> ChromaSmoothing {
        self.smoothing
    }
}

/// Terminal result of one job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Failure { kind: FailureKind, message: String },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success)
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            JobOutcome::Success => None,
            JobOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<ConvertError> for JobOutcome {
    fn from(err: ConvertError) -> Self {
        JobOutcome::Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<ConvertResult<()>> for JobOutcome {
    fn from(r: ConvertResult<()>) -> Self {
        match r {
            Ok(()) => JobOutcome::Success,
            Err(e) => e.into(),
        }
    }
}

/// Per-job lifecycle state. `Succeeded` and `Failed` are final.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

impl From<&JobOutcome> for JobState {
    fn from(outcome: &JobOutcome) -> Self {
        if outcome.is_success() {
            JobState::Succeeded
        } else {
            JobState::Failed
        }
    }
}

/// Outcome of every job in a finished batch. Each submitted job appears exactly once.
#[derive(Clone, Debug, Default)]
pub struct BatchResult {
    outcomes: HashMap<ConversionJob, JobOutcome>,
}

impl BatchResult {
    /// Record an outcome. Returns false (and keeps the first) if the job already has one.
    pub(crate) fn record(&mut self, job: ConversionJob, outcome: JobOutcome) -> bool {
        match self.outcomes.entry(job) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(outcome);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn get(&self, job: &ConversionJob) -> Option<&JobOutcome> {
        self.outcomes.get(job)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConversionJob, &JobOutcome)> {
        self.outcomes.iter()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// Flatten into report rows sorted by source path.
    pub fn report(&self) -> Vec<JobReport> {
        let mut rows: Vec<JobReport> = self
            .outcomes
            .iter()
            .map(|(job, outcome)| JobReport {
                name: job.name.clone(),
                source: job.source.clone(),
                status: if outcome.is_success() { "success" } else { "failure" },
                kind: outcome.failure_kind(),
                message: match outcome {
                    JobOutcome::Success => None,
                    JobOutcome::Failure { message, .. } => Some(message.clone()),
                },
            })
            .collect();
        rows.sort_by(|a, b| a.source.cmp(&b.source));
        rows
    }
}

/// One row of the JSON batch report.
#[derive(Clone, Debug, Serialize)]
pub struct JobReport {
    pub name: String,
    pub source: PathBuf,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Full options for a CLI conversion run.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// Converter executable. When None, resolved from env or the install layout.
    pub converter: Option<PathBuf>,
    /// Max converters running at once. When None, derived from thread count and FD limit.
    pub concurrency: Option<usize>,
    /// Write a JSON report of all outcomes here.
    pub report: Option<PathBuf>,
    /// Persist settings after the run.
    pub save_settings: bool,
    /// Debug logging and per-job detail.
    pub verbose: bool,
}
