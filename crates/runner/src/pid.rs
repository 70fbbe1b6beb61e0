// SPDX-License-Identifier: MIT

//! The unsynchronised `command_pid` cell (spec §5, §9): the worker writes it
//! while a child is live and clears it when the child exits; `Cancel` only
//! reads it to decide whether to send `SIGTERM`. A stale or zero read simply
//! means no signal is sent — cancellation still lands on the next
//! token-polling point.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;

/// Shared, lock-free handle to "the pid of the currently running child's
/// process group, or none". Cloned between the worker (writer) and the
/// task's `Cancel` handler (reader).
#[derive(Clone, Default)]
pub struct CommandPid(Arc<AtomicI32>);

impl CommandPid {
    pub fn new() -> Self {
        Self(Arc::new(AtomicI32::new(0)))
    }

    pub(crate) fn set(&self, pid: i32) {
        self.0.store(pid, Ordering::Relaxed);
    }

    pub(crate) fn clear(&self) {
        self.0.store(0, Ordering::Relaxed);
    }

    /// Send `SIGTERM` to the process group rooted at the current child, if
    /// any is running. A no-op (not an error) when no child is live.
    pub fn send_sigterm(&self) {
        let pid = self.0.load(Ordering::Relaxed);
        if pid <= 0 {
            return;
        }
        if let Err(err) = killpg(Pid::from_raw(pid), Signal::SIGTERM) {
            tracing::debug!(pid, %err, "SIGTERM to child process group failed (already reaped?)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_sigterm_on_empty_cell_is_a_harmless_no_op() {
        let pid = CommandPid::new();
        pid.send_sigterm();
    }

    #[test]
    fn set_then_clear_resets_to_zero() {
        let pid = CommandPid::new();
        pid.set(4242);
        pid.clear();
        assert_eq!(pid.0.load(Ordering::Relaxed), 0);
    }
}
