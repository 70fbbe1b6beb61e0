// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! reportd-runner: the event-runner library's contract (spec §1), consumed
//! by `reportd-engine` as an opaque capability — "given a dump-directory
//! path and an event name, spawn one or more configured child processes,
//! piping their stdout/stderr through logging callbacks and consulting
//! interaction callbacks for prompts."

pub mod command;
pub mod interactor;
pub mod pid;
pub mod runner;

pub use command::{CommandSpec, EventTable, EventTableLoadError};
pub use interactor::{FixedInteractor, Interactor, PromptReply};
pub use pid::CommandPid;
pub use runner::{ChildProcessRunner, EventOutcome, EventRunContext, EventRunner, LogSink, RunnerError};
