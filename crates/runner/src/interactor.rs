// SPDX-License-Identifier: MIT

//! The runner's "interaction callbacks" (spec §1, §4.2): consulted whenever
//! a running command needs input from the interactive client before it can
//! continue.

use async_trait::async_trait;
use reportd_core::PromptKind;

/// What the prompt rendezvous produced, or [`Cancelled`](PromptReply::Cancelled)
/// if the task was cancelled while the runner was waiting (spec §4.2 step 4:
/// "returns a sentinel ... to the runner, which must abort the current
/// command").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptReply {
    Text(String),
    YesNo { response: bool, remember: bool },
    Cancelled,
}

/// Bridges a running command's request for input to whatever is driving the
/// task (in production, a `Prompt` bus object and its `Commit()` rendezvous;
/// in tests, a scripted or always-same answer).
#[async_trait]
pub trait Interactor: Send + Sync {
    async fn ask(&self, kind: PromptKind, message: &str) -> PromptReply;
}

/// An interactor that answers every prompt the same way, for commands that
/// never prompt or for tests that don't care about prompt content.
pub struct FixedInteractor(PromptReply);

impl FixedInteractor {
    pub fn always(reply: PromptReply) -> Self {
        Self(reply)
    }

    pub fn always_cancelled() -> Self {
        Self(PromptReply::Cancelled)
    }
}

#[async_trait]
impl Interactor for FixedInteractor {
    async fn ask(&self, _kind: PromptKind, _message: &str) -> PromptReply {
        self.0.clone()
    }
}
