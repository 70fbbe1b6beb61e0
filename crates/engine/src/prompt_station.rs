// SPDX-License-Identifier: MIT

//! The prompt rendezvous (spec §4.2 "Prompt dialogue"): exports a fresh
//! `Prompt` object, emits a `Prompt` signal on the owning task, and blocks
//! the calling event-runner callback until a bus client calls `Commit()` on
//! that object or the task is cancelled.
//!
//! There is no real bus dispatcher in this workspace to route an inbound
//! `Commit()` call to the right [`PromptStation`]; whatever owns the bus
//! connection is expected to look up the station for a task and call
//! [`PromptStation::commit`] directly. [`PromptStation`] only has to
//! publish the object and wait — spec §1 puts bus wiring out of scope.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use reportd_bus::{uniquify_path, ObjectServer, SignalEmitter};
use reportd_core::{Prompt, PromptKind};
use reportd_runner::{Interactor, PromptReply};

/// Re-checked cancellation-polling interval for the prompt wait (spec §4.2
/// step 3, §5 "Timeouts").
const PROMPT_POLL_INTERVAL: Duration = Duration::from_millis(250);

struct PendingPrompt {
    path: String,
    answer: Option<Prompt>,
}

/// One task's prompt rendezvous state. Shared between the worker (waiting in
/// [`ask`](Interactor::ask)) and whatever delivers `Commit()` calls from the
/// bus (calling [`commit`](Self::commit)).
pub struct PromptStation {
    bus: Arc<dyn ObjectServer>,
    task_signal: SignalEmitter,
    prompt_base_path: String,
    cancel: CancellationToken,
    /// Messages remembered as permanently declined (spec §4.2: "a stored
    /// setting of `no` means yes, forever"). Keyed by the prompt message
    /// text, since no per-prompt identity survives past the runner callback
    /// (a simplification documented here, not in spec.md).
    remembered_no: Mutex<HashSet<String>>,
    /// Saved answers for `AskYesNoSave` (spec §4.2: "`response` plus
    /// `remember` persistence for the yes/no-forever and yes/no-save
    /// variants"). Unlike `remembered_no`, a save persists whichever answer
    /// the user actually gave, not just `no`. Keyed by message text, same
    /// simplification as `remembered_no`.
    saved: Mutex<HashMap<String, bool>>,
    pending: Mutex<Option<PendingPrompt>>,
    notify: Notify,
}

impl PromptStation {
    pub fn new(
        bus: Arc<dyn ObjectServer>,
        task_signal: SignalEmitter,
        prompt_base_path: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            bus,
            task_signal,
            prompt_base_path: prompt_base_path.into(),
            cancel,
            remembered_no: Mutex::new(HashSet::new()),
            saved: Mutex::new(HashMap::new()),
            pending: Mutex::new(None),
            notify: Notify::new(),
        }
    }

    /// Deliver a `Commit()` call for the prompt currently exported at
    /// `prompt_path`. Returns `false` if no prompt is pending there (a
    /// stale or duplicate `Commit`).
    pub fn commit(&self, prompt_path: &str, answer: Prompt) -> bool {
        let matched = {
            let mut guard = self.pending.lock();
            match guard.as_mut() {
                Some(pending) if pending.path == prompt_path => {
                    pending.answer = Some(answer);
                    true
                }
                _ => false,
            }
        };
        if matched {
            self.notify.notify_waiters();
        }
        matched
    }

    /// Wake the wait loop immediately instead of leaving it to the next
    /// 250 ms poll (spec §4.2 `Cancel`: "signals the prompt condition
    /// variable").
    pub fn wake_for_cancel(&self) {
        self.notify.notify_waiters();
    }

    async fn wait_for_commit(&self, path: &str) -> Option<Prompt> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }
            let _ = tokio::time::timeout(PROMPT_POLL_INTERVAL, self.notify.notified()).await;
            if self.cancel.is_cancelled() {
                return None;
            }
            let answer = self
                .pending
                .lock()
                .as_ref()
                .filter(|pending| pending.path == path)
                .and_then(|pending| pending.answer.clone());
            if answer.is_some() {
                return answer;
            }
        }
    }
}

#[async_trait]
impl Interactor for PromptStation {
    async fn ask(&self, kind: PromptKind, message: &str) -> PromptReply {
        if kind == PromptKind::AskYesNoYesForever && self.remembered_no.lock().contains(message) {
            return PromptReply::YesNo { response: true, remember: false };
        }
        if kind == PromptKind::AskYesNoSave {
            if let Some(response) = self.saved.lock().get(message).copied() {
                return PromptReply::YesNo { response, remember: false };
            }
        }

        let path = uniquify_path(&self.prompt_base_path);
        if let Err(err) = self.bus.register_object(&path) {
            tracing::warn!(%err, path, "failed to export prompt object");
            return PromptReply::Cancelled;
        }
        *self.pending.lock() = Some(PendingPrompt { path: path.clone(), answer: None });
        self.task_signal.emit(
            "Prompt",
            json!({ "object_path": path, "message": message, "type": kind.code() }),
        );

        let answer = self.wait_for_commit(&path).await;

        *self.pending.lock() = None;
        self.bus.unregister_object(&path);

        let Some(prompt) = answer else {
            return PromptReply::Cancelled;
        };

        match kind {
            PromptKind::Ask | PromptKind::AskPassword => PromptReply::Text(prompt.input),
            PromptKind::AskYesNoYesForever => {
                if prompt.remember && !prompt.response {
                    self.remembered_no.lock().insert(message.to_string());
                }
                PromptReply::YesNo { response: prompt.response, remember: prompt.remember }
            }
            PromptKind::AskYesNoSave => {
                if prompt.remember {
                    self.saved.lock().insert(message.to_string(), prompt.response);
                }
                PromptReply::YesNo { response: prompt.response, remember: prompt.remember }
            }
            PromptKind::AskYesNo => {
                PromptReply::YesNo { response: prompt.response, remember: prompt.remember }
            }
        }
    }
}

#[cfg(test)]
#[path = "prompt_station_tests.rs"]
mod tests;
