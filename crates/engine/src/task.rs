// SPDX-License-Identifier: MIT

//! [`TaskEngine`]: the worker behind one `Task` bus object (spec §4.2).
//!
//! The redesign note in spec §9 replaces the source's cooperative
//! single-threaded dispatch with blocking workers with "task per worker
//! thread + cancellation token". Since every other crate in this workspace
//! is already built on `tokio`, "dedicated worker thread" is implemented as
//! a dedicated `tokio::spawn` task: [`start`](TaskEngine::start) dispatches
//! it immediately and only resolves once the chain reaches a terminal
//! state, which is what lets whatever holds the bus-side `Start` invocation
//! simply `.await` it for the reply spec §4.2 step 6 describes.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use reportd_bus::{BusClient, SignalEmitter};
use reportd_cache::ProblemCache;
use reportd_core::{EngineError, ProblemRef, TaskStatus, Workflow};
use reportd_runner::{CommandPid, EventRunContext, EventRunner, Interactor};

use crate::prompt_station::PromptStation;
use crate::quirks::rewrite_exit_code;

/// Environment variable every event-handler child sees (spec §4.2 step 2,
/// §6).
const WORKFLOW_ENV_VAR: &str = "LIBREPORT_WORKFLOW";

/// One workflow run against one problem entry: owns the cancellation token,
/// the unsynchronised `command_pid` cell `Cancel` reads (spec §5, §9), and
/// the prompt rendezvous.
pub struct TaskEngine<B: BusClient, R: EventRunner> {
    cache: Arc<ProblemCache<B>>,
    runner: Arc<R>,
    workflow: Workflow,
    entry: ProblemRef,
    status: Mutex<TaskStatus>,
    cancel: CancellationToken,
    command_pid: CommandPid,
    progress: SignalEmitter,
    prompts: Arc<PromptStation>,
}

impl<B: BusClient + 'static, R: EventRunner + 'static> TaskEngine<B, R> {
    /// `command_pid` must be the same handle the caller constructed `runner`
    /// with, so `Cancel`'s SIGTERM reaches whatever child is currently live
    /// (spec §5: "a deliberate unsynchronised read"). `cancel` must be the
    /// same token `prompts` was constructed with, so `Cancel`'s token-fire
    /// and the prompt wait's cancellation check agree on the same signal.
    pub fn new(
        cache: Arc<ProblemCache<B>>,
        runner: Arc<R>,
        command_pid: CommandPid,
        workflow: Workflow,
        entry: ProblemRef,
        progress: SignalEmitter,
        prompts: Arc<PromptStation>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            cache,
            runner,
            workflow,
            entry,
            status: Mutex::new(TaskStatus::Ready),
            cancel,
            command_pid,
            progress,
            prompts,
        }
    }

    pub fn status(&self) -> TaskStatus {
        *self.status.lock()
    }

    /// The bus path this task is exported at, for a registry keyed by
    /// object path (spec §4.3 `PeerTaskRegistry`).
    pub fn object_path(&self) -> &str {
        self.progress.path()
    }

    /// `Cancel` (spec §4.2, §5): cancel the token, SIGTERM the live child
    /// process group if any, and wake the prompt wait immediately. Replies
    /// `OK` by returning — the eventual `CANCELED` transition is observed
    /// through [`start`](Self::start)'s return value, not this call.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.command_pid.send_sigterm();
        self.prompts.wake_for_cancel();
    }

    /// `Start` (spec §4.2): valid only from `READY`. Dispatches the worker
    /// and resolves once the task reaches a terminal state.
    pub async fn start(self: &Arc<Self>) -> Result<(), EngineError> {
        {
            let mut status = self.status.lock();
            if !status.can_start() {
                return Err(EngineError::NotReady);
            }
            *status = TaskStatus::Running;
        }

        let this = Arc::clone(self);
        let result = match tokio::spawn(async move { this.run_chain().await }).await {
            Ok(result) => result,
            Err(_join_error) => Err(EngineError::Cancelled),
        };
        let result = result.map_err(|err| err.prefer_cancelled(self.cancel.is_cancelled()));

        *self.status.lock() = match &result {
            Ok(()) => TaskStatus::Completed,
            Err(EngineError::Cancelled) => TaskStatus::Canceled,
            Err(_) => TaskStatus::Failed,
        };
        result
    }

    async fn run_chain(&self) -> Result<(), EngineError> {
        let dump_dir = self.cache.get_working_directory(&self.entry).await?;
        let extra_env = vec![(WORKFLOW_ENV_VAR.to_string(), self.workflow.name.clone())];

        for event_name in &self.workflow.events {
            if self.cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            let ctx = EventRunContext {
                dump_dir: &dump_dir,
                event_name,
                extra_env: extra_env.clone(),
                log: self.log_sink(),
                interactor: self.prompts.clone() as Arc<dyn Interactor>,
                cancel: self.cancel.clone(),
            };
            let outcome =
                self.runner.run_event(ctx).await.map_err(|err| EngineError::Runner(err.to_string()))?;

            if self.cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            let exit_code = rewrite_exit_code(event_name, outcome.exit_code);
            if exit_code != 0 {
                return Err(EngineError::EventHandlerFailed {
                    event: event_name.clone(),
                    code: exit_code,
                });
            }
            if outcome.children_count == 0 {
                return Err(EngineError::NoEventHandlers { event: event_name.clone() });
            }
        }

        self.cache.push_working_directory(&dump_dir).await?;
        Ok(())
    }

    fn log_sink(&self) -> reportd_runner::LogSink {
        let progress = self.progress.clone();
        Arc::new(move |line: &str| progress.emit("Progress", json!({ "line": line })))
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
