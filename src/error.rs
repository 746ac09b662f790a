//! Conversion error taxonomy.
//!
//! Only [`ConvertError::ConfigurationInvalid`] raised during batch validation is fatal to a batch;
//! every other variant is captured into the failing job's [`JobOutcome`](crate::JobOutcome).

use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while validating, planning or running a conversion.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("output already exists: {}", .path.display())]
    OutputCollision { path: PathBuf },

    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch converter {}: {source}", .program.display())]
    ProcessSpawnFailed {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("converter exited with {status}")]
    ProcessExitedNonZero { status: String },

    #[error("runner panicked: {message}")]
    RunnerPanicked { message: String },
}

impl ConvertError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ConvertError::ConfigurationInvalid(msg.into())
    }

    /// Category of this error as recorded on a job outcome.
    pub fn kind(&self) -> FailureKind {
        match self {
            ConvertError::ConfigurationInvalid(_) => FailureKind::ConfigurationInvalid,
            ConvertError::OutputCollision { .. } => FailureKind::OutputCollision,
            ConvertError::OutputUnavailable { .. } => FailureKind::OutputUnavailable,
            ConvertError::ProcessSpawnFailed { .. } => FailureKind::ProcessSpawnFailed,
            ConvertError::ProcessExitedNonZero { .. } => FailureKind::ProcessExitedNonZero,
            ConvertError::RunnerPanicked { .. } => FailureKind::RunnerPanicked,
        }
    }
}

/// Cloneable category of a job failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ConfigurationInvalid,
    OutputCollision,
    OutputUnavailable,
    ProcessSpawnFailed,
    ProcessExitedNonZero,
    RunnerPanicked,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ConfigurationInvalid => "configuration invalid",
            FailureKind::OutputCollision => "output collision",
            FailureKind::OutputUnavailable => "output unavailable",
            FailureKind::ProcessSpawnFailed => "spawn failed",
            FailureKind::ProcessExitedNonZero => "converter error",
            FailureKind::RunnerPanicked => "runner panicked",
        }
    }
}

/// Result alias for conversion-level operations.
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;
