// src/exec/supervisor.rs

//! The supervised run: spawn, drain, wait with a deadline, classify.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, error, info, warn};

use super::drain::{DrainHandle, DrainSummary, Stream, spawn_drain};
use super::outcome::{RunReport, RunResult};
use super::sink::{LineSink, PrefixedPrinter};
use super::spec::CommandSpec;
use super::terminate::{sweep_group, terminate};

/// Default bound on how long a child may run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1000);
/// Default time a child gets between SIGTERM and SIGKILL.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(5);
/// Default time the drain tasks get to hit end-of-stream after the child is gone.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Tunables for a [`Supervisor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorOptions {
    pub timeout: Duration,
    pub kill_grace: Duration,
    pub drain_grace: Duration,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            kill_grace: DEFAULT_KILL_GRACE,
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }
}

impl SupervisorOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Runs one [`CommandSpec`] at a time to completion or timeout.
///
/// Output lines go to the configured [`LineSink`]; by default they are
/// printed with a `[stdout]` / `[stderr]` prefix.
#[derive(Clone)]
pub struct Supervisor {
    options: SupervisorOptions,
    sink: Arc<dyn LineSink>,
}

impl Supervisor {
    pub fn new(options: SupervisorOptions) -> Self {
        Self {
            options,
            sink: Arc::new(PrefixedPrinter),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn LineSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Run `spec` and return only the terminal state.
    pub async fn launch(&self, spec: &CommandSpec) -> RunResult {
        self.run(spec).await.result
    }

    /// Run `spec` and return the terminal state plus diagnostics.
    pub async fn run(&self, spec: &CommandSpec) -> RunReport {
        let started = Instant::now();

        info!(
            command = %spec,
            working_dir = ?spec.working_dir(),
            env_override = spec.env().is_some(),
            timeout_ms = self.options.timeout.as_millis() as u64,
            "spawning child process"
        );

        let mut child = match spec.to_command().spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(command = %spec, error = %e, "failed to spawn child process");
                return RunReport {
                    result: RunResult::SpawnFailed {
                        cause: e.to_string(),
                    },
                    pid: None,
                    stdout: DrainSummary::empty(Stream::Stdout),
                    stderr: DrainSummary::empty(Stream::Stderr),
                    elapsed: started.elapsed(),
                };
            }
        };

        let pid = child.id();
        info!(pid = ?pid, "child process started");

        // Both pipes must be drained from here on, or a chatty child stalls
        // on whichever buffer fills first.
        let stdout_task = child
            .stdout
            .take()
            .map(|out| spawn_drain(Stream::Stdout, out, Arc::clone(&self.sink)));
        let stderr_task = child
            .stderr
            .take()
            .map(|err| spawn_drain(Stream::Stderr, err, Arc::clone(&self.sink)));
        debug!(pid = ?pid, "drain tasks started");

        let result = match timeout(self.options.timeout, child.wait()).await {
            Ok(Ok(status)) => {
                let exit_code = status.code().unwrap_or(-1);
                info!(
                    pid = ?pid,
                    exit_code,
                    success = status.success(),
                    "child process exited"
                );
                RunResult::Completed { exit_code }
            }
            Ok(Err(e)) => {
                error!(pid = ?pid, error = %e, "waiting for child process failed");
                terminate(&mut child, self.options.kill_grace).await;
                RunResult::Completed { exit_code: -1 }
            }
            Err(_) => {
                warn!(
                    pid = ?pid,
                    timeout_ms = self.options.timeout.as_millis() as u64,
                    "child process timed out; terminating"
                );
                terminate(&mut child, self.options.kill_grace).await;
                RunResult::TimedOut
            }
        };

        let deadline = Instant::now() + self.options.drain_grace;
        let stdout = join_drain(Stream::Stdout, stdout_task, deadline).await;
        let stderr = join_drain(Stream::Stderr, stderr_task, deadline).await;

        // The child is reaped by now; anything left in its group is an orphan.
        if let Some(pid) = pid {
            sweep_group(pid);
        }

        info!(
            pid = ?pid,
            stdout_lines = stdout.lines,
            stderr_lines = stderr.lines,
            result = ?result,
            "supervised run finished"
        );

        RunReport {
            result,
            pid,
            stdout,
            stderr,
            elapsed: started.elapsed(),
        }
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(SupervisorOptions::default())
    }
}

/// Run `spec` with the given timeout and the default printer sink.
pub async fn launch(spec: &CommandSpec, timeout: Duration) -> RunResult {
    Supervisor::new(SupervisorOptions::default().with_timeout(timeout))
        .launch(spec)
        .await
}

/// Wait for a drain task until `deadline`, aborting it if it is still reading.
///
/// A grandchild that inherited the pipe can keep it open after the child is
/// gone; in that case we stop reading rather than hang.
async fn join_drain(
    stream: Stream,
    drain: Option<DrainHandle>,
    deadline: Instant,
) -> DrainSummary {
    let Some(DrainHandle { mut task, lines }) = drain else {
        return DrainSummary::empty(stream);
    };

    let cut_short = |reason: String| DrainSummary {
        stream,
        lines: lines.load(Ordering::Relaxed),
        read_error: Some(reason),
    };

    match timeout_at(deadline, &mut task).await {
        Ok(Ok(summary)) => summary,
        Ok(Err(e)) => {
            warn!(%stream, error = %e, "drain task did not complete cleanly");
            cut_short(e.to_string())
        }
        Err(_) => {
            warn!(%stream, "drain task still reading after grace period; aborting");
            task.abort();
            cut_short("drain aborted after grace period".to_string())
        }
    }
}
