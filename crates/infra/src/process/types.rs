//! Process invocation request/outcome types.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// A request to run one external executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub working_dir: PathBuf,
    pub timeout: Duration,
}

impl ProcessInvocation {
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Program name for logs and error messages.
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Check the preconditions that can be checked without spawning.
    ///
    /// A program given as a path must be an existing file; a bare name is left
    /// to `PATH` resolution at spawn time.
    pub fn validate(&self) -> Result<(), ProcessError> {
        if self.timeout.is_zero() {
            return Err(ProcessError::InvalidInvocation(format!(
                "timeout for {} must be greater than zero",
                self.program_name()
            )));
        }

        if !self.working_dir.is_dir() {
            return Err(ProcessError::InvalidInvocation(format!(
                "working directory {} does not exist",
                self.working_dir.display()
            )));
        }

        if is_path_like(&self.program) && !self.program.is_file() {
            return Err(ProcessError::RuntimeUnavailable {
                program: self.program_name(),
                reason: "no such file".to_string(),
            });
        }

        Ok(())
    }
}

fn is_path_like(program: &Path) -> bool {
    program.components().count() > 1 || program.is_absolute()
}

/// Text captured from a process that exited successfully.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Why an invocation failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// Still running when the budget elapsed; the process was killed.
    #[error("{program} timed out after {}ms", after.as_millis())]
    Timeout { program: String, after: Duration },

    /// Exited with a non-zero status (or was killed by a signal).
    #[error("{program} exited with {status}: {stderr}")]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        status: String,
        stderr: String,
    },

    /// The executable could not be found or started.
    #[error("runtime {program} unavailable: {reason}")]
    RuntimeUnavailable { program: String, reason: String },

    /// Preconditions failed before anything was spawned.
    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),

    /// Pipe or wait failure after a successful spawn.
    #[error("process i/o failed: {0}")]
    Io(String),
}

impl ProcessError {
    pub fn code(&self) -> &'static str {
        match self {
            ProcessError::Timeout { .. } => "process_timeout",
            ProcessError::NonZeroExit { .. } => "process_non_zero_exit",
            ProcessError::RuntimeUnavailable { .. } => "runtime_unavailable",
            ProcessError::InvalidInvocation(_) => "invalid_invocation",
            ProcessError::Io(_) => "process_io",
        }
    }
}
