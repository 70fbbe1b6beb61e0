// SPDX-License-Identifier: MIT

//! Task identity and the `READY -> RUNNING -> {COMPLETED, FAILED, CANCELED}`
//! state machine (spec §3 "Task", §8 invariants).

crate::define_id! {
    /// Identifies one workflow run against one problem entry.
    pub struct TaskId("tsk-");
}

/// The spec picks a single representation for `Status` (it notes the
/// original source straddled string and numeric enum revisions — see
/// spec §9). This implementation publishes the string form on the wire and
/// keeps the numeric discriminant internal via `as u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Ready,
    Running,
    Completed,
    Failed,
    Canceled,
}

impl TaskStatus {
    /// Terminal states are absorbing: once reached, `Status` never changes
    /// again (spec §8 invariant).
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Canceled)
    }

    /// Whether `Start` may be called while the task is in this state.
    /// Exactly one `Start` call is valid per task (spec §3).
    pub fn can_start(self) -> bool {
        matches!(self, TaskStatus::Ready)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Ready => "READY",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ready_can_start() {
        assert!(TaskStatus::Ready.can_start());
        for s in [TaskStatus::Running, TaskStatus::Completed, TaskStatus::Failed, TaskStatus::Canceled]
        {
            assert!(!s.can_start());
        }
    }

    #[test]
    fn terminal_states_are_absorbing() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Canceled.is_terminal());
        assert!(!TaskStatus::Ready.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
    }

    #[test]
    fn task_id_has_stable_prefix() {
        let id = TaskId::new();
        assert!(id.as_str().starts_with("tsk-"));
    }
}
