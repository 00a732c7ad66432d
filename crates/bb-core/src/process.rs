//! Child processes bound to the caller's future
//!
//! Engine launchers and `npm test` fork their own workers (`java`, `node`),
//! so killing only the direct child leaves those running against the
//! service. On Unix every child is started as the leader of a new process
//! group, and the whole group receives `SIGKILL` if the future running it is
//! dropped before the child exits (timeout or cancellation).

use std::io;
use std::process::Output;
use tokio::process::Command;

/// Spawn `command` in its own process group and collect its output.
///
/// Dropping the returned future before completion kills the child and every
/// process in its group.
pub(crate) async fn output(command: std::process::Command) -> io::Result<Output> {
    let mut command = Command::from(in_new_group(command));
    command.kill_on_drop(true);

    let child = command.spawn()?;
    let group = GroupGuard::new(child.id());
    let output = child.wait_with_output().await;
    group.disarm();
    output
}

#[cfg(unix)]
fn in_new_group(mut command: std::process::Command) -> std::process::Command {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
    command
}

#[cfg(not(unix))]
fn in_new_group(command: std::process::Command) -> std::process::Command {
    command
}

/// Kills the process group led by `pgid` when dropped while armed.
#[derive(Debug)]
struct GroupGuard {
    pgid: Option<u32>,
}

impl GroupGuard {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    /// The child exited on its own; leave the group alone.
    fn disarm(mut self) {
        self.pgid = None;
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_group(pgid);
        }
    }
}

#[cfg(unix)]
fn kill_group(pgid: u32) {
    // SAFETY: a negative pid addresses the process group; the group was
    // created for this child and is still owned by us while the guard is armed.
    let result = unsafe { libc::kill(-(pgid as libc::pid_t), libc::SIGKILL) };
    if result != 0 {
        tracing::debug!(
            pgid,
            "process group already gone: {}",
            io::Error::last_os_error()
        );
    } else {
        tracing::debug!(pgid, "killed process group");
    }
}

#[cfg(not(unix))]
fn kill_group(_pgid: u32) {}
