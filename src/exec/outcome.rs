// src/exec/outcome.rs

use std::time::Duration;

use thiserror::Error;

use super::drain::DrainSummary;

/// Terminal state of one supervised run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    /// The child exited on its own before the deadline.
    ///
    /// A child killed by a signal it did not get from us reports `-1`.
    Completed { exit_code: i32 },
    /// The deadline elapsed; the child (and its process group) was killed.
    TimedOut,
    /// The process could not be created at all.
    SpawnFailed { cause: String },
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Completed { exit_code: 0 })
    }

    /// Map to pass/fail the way a test assertion wants it.
    pub fn verdict(&self) -> Result<(), RunFailure> {
        match self {
            RunResult::Completed { exit_code: 0 } => Ok(()),
            RunResult::Completed { exit_code } => Err(RunFailure::NonZeroExit(*exit_code)),
            RunResult::TimedOut => Err(RunFailure::TimedOut),
            RunResult::SpawnFailed { cause } => Err(RunFailure::SpawnFailed(cause.clone())),
        }
    }
}

/// Why a run did not pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunFailure {
    #[error("timed out")]
    TimedOut,

    #[error("spawn failed: {0}")]
    SpawnFailed(String),

    #[error("non-zero exit {0}")]
    NonZeroExit(i32),
}

/// Everything known about a run once it is over.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub result: RunResult,
    /// OS pid of the child; `None` when spawning failed.
    pub pid: Option<u32>,
    pub stdout: DrainSummary,
    pub stderr: DrainSummary,
    pub elapsed: Duration,
}
