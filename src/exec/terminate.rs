// src/exec/terminate.rs

//! Killing a child's process group without leaving orphans behind.
//!
//! On unix the child leads its own process group (see
//! [`CommandSpec`](super::CommandSpec)), so signals go to the whole group.
//! Every run ends with [`sweep_group`]; a timed-out run goes through
//! [`terminate`] first:
//!
//! 1. `SIGTERM` to the group.
//! 2. Wait up to `grace` for the child to exit.
//! 3. `SIGKILL` to the group if it did not.
//! 4. A final `SIGKILL` sweep of the group for anything the child left
//!    running, then reap the child.

use std::time::Duration;

use tokio::process::Child;
use tracing::{debug, info, warn};

/// Stop `child` and everything in its process group, then reap it.
pub(crate) async fn terminate(child: &mut Child, grace: Duration) {
    let Some(pid) = child.id() else {
        debug!("child already reaped; nothing to terminate");
        return;
    };

    #[cfg(unix)]
    {
        use nix::sys::signal::Signal;
        use tokio::time::timeout;

        info!(pid, "sending SIGTERM to process group");
        signal_group(pid, Signal::SIGTERM);

        match timeout(grace, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(pid, ?status, "child exited after SIGTERM");
            }
            Ok(Err(e)) => {
                warn!(pid, error = %e, "waiting for child after SIGTERM failed");
            }
            Err(_) => {
                warn!(
                    pid,
                    grace_ms = grace.as_millis() as u64,
                    "child ignored SIGTERM; sending SIGKILL to process group"
                );
            }
        }

        // Either escalation or a sweep for leftovers; both are the same call.
        signal_group(pid, Signal::SIGKILL);
    }

    #[cfg(not(unix))]
    {
        info!(pid, grace_ms = grace.as_millis() as u64, "killing child process");
    }

    match child.try_wait() {
        Ok(Some(status)) => debug!(pid, ?status, "child reaped"),
        _ => {
            if let Err(e) = child.kill().await {
                warn!(pid, error = %e, "failed to kill child process");
            }
        }
    }
}

/// SIGKILL whatever is left in the group led by the (already reaped) child.
///
/// A child that exits normally can leave background processes behind that
/// still hold its pipes; they go too.
pub(crate) fn sweep_group(pid: u32) {
    #[cfg(unix)]
    signal_group(pid, nix::sys::signal::Signal::SIGKILL);

    #[cfg(not(unix))]
    debug!(pid, "no process groups on this platform; nothing to sweep");
}

#[cfg(unix)]
fn signal_group(pid: u32, signal: nix::sys::signal::Signal) {
    use nix::errno::Errno;
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        warn!(pid, "pid does not fit in pid_t; cannot signal group");
        return;
    };

    match killpg(Pid::from_raw(raw), signal) {
        Ok(()) => {}
        // Group already empty.
        Err(Errno::ESRCH) => debug!(pid, ?signal, "process group already gone"),
        Err(e) => warn!(pid, ?signal, error = %e, "failed to signal process group"),
    }
}
