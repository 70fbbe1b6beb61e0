// SPDX-License-Identifier: MIT

//! Transient prompt objects created by the task engine during a run
//! (spec §3 "Prompt", §4.2 "Prompt dialogue").

crate::define_id! {
    /// Identifies one transient prompt object, unique per `Prompt` signal.
    pub struct PromptId("prm-");
}

/// The five prompt flavours the event-runner library can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromptKind {
    Ask,
    AskYesNo,
    AskYesNoYesForever,
    AskYesNoSave,
    AskPassword,
}

impl PromptKind {
    /// The wire-level integer code spec §3 calls `type`.
    pub fn code(self) -> i32 {
        match self {
            PromptKind::Ask => 0,
            PromptKind::AskYesNo => 1,
            PromptKind::AskYesNoYesForever => 2,
            PromptKind::AskYesNoSave => 3,
            PromptKind::AskPassword => 4,
        }
    }

    /// Whether the answer the runner wants is free text (`input`) rather
    /// than a boolean `response`.
    pub fn wants_text(self) -> bool {
        matches!(self, PromptKind::Ask | PromptKind::AskPassword)
    }
}

/// A live prompt's state: the message shown to the client and the slots a
/// `Commit()` call fills in before the worker is allowed to proceed.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Prompt {
    pub message: String,
    pub input: String,
    pub response: bool,
    pub remember: bool,
}

impl Prompt {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Default::default() }
    }
}
