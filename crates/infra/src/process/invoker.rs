//! Process invoker seam and its tokio-backed implementation.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::types::{ProcessError, ProcessInvocation, ProcessOutput};

/// Runs external executables.
///
/// Callers see one outcome per invocation: captured output on a zero exit,
/// otherwise a single [`ProcessError`]. Implementations keep no state across
/// calls.
#[async_trait]
pub trait ProcessInvoker: Send + Sync + 'static {
    async fn invoke(&self, invocation: &ProcessInvocation) -> Result<ProcessOutput, ProcessError>;
}

/// Spawns real OS processes with `tokio::process`.
///
/// Children are spawned with `kill_on_drop`, so when the timeout fires and the
/// wait future is dropped the process is killed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessInvoker;

impl TokioProcessInvoker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessInvoker for TokioProcessInvoker {
    async fn invoke(&self, invocation: &ProcessInvocation) -> Result<ProcessOutput, ProcessError> {
        invocation.validate()?;

        let program = invocation.program_name();
        let started = Instant::now();

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => ProcessError::RuntimeUnavailable {
                    program: program.clone(),
                    reason: e.to_string(),
                },
                _ => ProcessError::Io(e.to_string()),
            })?;

        debug!(program = %program, pid = child.id(), "spawned process");

        let output = match tokio::time::timeout(invocation.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ProcessError::Io(e.to_string()))?,
            Err(_) => {
                warn!(
                    program = %program,
                    timeout_ms = invocation.timeout.as_millis() as u64,
                    "process timed out; killed"
                );
                return Err(ProcessError::Timeout {
                    program,
                    after: invocation.timeout,
                });
            }
        };

        let elapsed = started.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ProcessError::NonZeroExit {
                program,
                code: output.status.code(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        debug!(
            program = %program,
            elapsed_ms = elapsed.as_millis() as u64,
            stdout_bytes = stdout.len(),
            "process exited successfully"
        );

        Ok(ProcessOutput {
            stdout,
            stderr,
            elapsed,
        })
    }
}
