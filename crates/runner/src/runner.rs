// SPDX-License-Identifier: MIT

//! The opaque event-runner capability (spec §1, §4.2): "given a dump-directory
//! path and an event name, spawn one or more configured child processes,
//! piping their stdout/stderr through logging callbacks and consulting
//! interaction callbacks for prompts."
//!
//! [`ChildProcessRunner`] is the concrete implementation: each command in the
//! event's chain is spawned in its own process group (so `Cancel` can signal
//! the whole subtree via [`CommandPid`]), its stdout/stderr lines are pumped
//! to a logging callback, and a minimal textual protocol on stdout
//! (`ASK <msg>`, `ASK_YES_NO <msg>`, `ASK_PASSWORD <msg>`) drives the
//! interaction callback, with the reply written back to the child's stdin.
//! This protocol is a simplification of the real reporting tools' IPC; spec
//! §1 puts the runner's internals out of scope and only specifies the shape
//! of the logging/interaction callbacks it exposes to the core.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use reportd_core::PromptKind;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::command::{CommandSpec, EventTable};
use crate::interactor::{Interactor, PromptReply};
use crate::pid::CommandPid;

pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("unknown event `{0}`")]
    UnknownEvent(String),

    #[error("spawning `{program}` for event `{event}`: {source}")]
    Spawn { event: String, program: String, #[source] source: std::io::Error },

    #[error("waiting on `{program}` for event `{event}`: {source}")]
    Wait { event: String, program: String, #[source] source: std::io::Error },
}

/// Result of running one event's command chain, before quirk rewriting
/// (spec §4.2 step 4: "interpret the runner's exit code").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventOutcome {
    pub children_count: u32,
    pub exit_code: i32,
}

/// Everything [`EventRunner::run_event`] needs, gathered so the trait method
/// itself stays narrow.
pub struct EventRunContext<'a> {
    pub dump_dir: &'a Path,
    pub event_name: &'a str,
    pub extra_env: Vec<(String, String)>,
    pub log: LogSink,
    pub interactor: Arc<dyn Interactor>,
    pub cancel: CancellationToken,
}

#[async_trait::async_trait]
pub trait EventRunner: Send + Sync {
    async fn run_event(&self, ctx: EventRunContext<'_>) -> Result<EventOutcome, RunnerError>;
}

/// Spawns the commands configured for an event against a real dump
/// directory (spec §4.2, §5).
pub struct ChildProcessRunner {
    events: EventTable,
    command_pid: CommandPid,
}

impl ChildProcessRunner {
    pub fn new(events: EventTable, command_pid: CommandPid) -> Self {
        Self { events, command_pid }
    }

    async fn run_command(
        &self,
        dump_dir: &Path,
        spec: &CommandSpec,
        extra_env: &[(String, String)],
        log: &LogSink,
        interactor: &Arc<dyn Interactor>,
        cancel: &CancellationToken,
        event_name: &str,
    ) -> Result<i32, RunnerError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(dump_dir)
            .envs(extra_env.iter().cloned())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);

        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            event: event_name.to_string(),
            program: spec.program.clone(),
            source,
        })?;

        if let Some(pid) = child.id() {
            self.command_pid.set(pid as i32);
        }

        let mut stdin = child.stdin.take();
        let stdout = child.stdout.take().expect("piped stdout");
        let stderr = child.stderr.take().expect("piped stderr");

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    self.command_pid.send_sigterm();
                    break;
                }
                line = stdout_lines.next_line() => {
                    match line {
                        Ok(Some(line)) => {
                            if let Some((kind, message)) = parse_prompt_marker(&line) {
                                let reply = interactor.ask(kind, message).await;
                                if let Some(stdin) = stdin.as_mut() {
                                    write_prompt_reply(stdin, &reply).await;
                                }
                                if reply == PromptReply::Cancelled {
                                    self.command_pid.send_sigterm();
                                    break;
                                }
                            } else {
                                (log)(&line);
                            }
                        }
                        Ok(None) => break,
                        Err(_) => break,
                    }
                }
                line = stderr_lines.next_line() => {
                    match line {
                        Ok(Some(line)) => (log)(&line),
                        Ok(None) => {}
                        Err(_) => {}
                    }
                }
            }
        }

        let status = child.wait().await.map_err(|source| RunnerError::Wait {
            event: event_name.to_string(),
            program: spec.program.clone(),
            source,
        })?;
        self.command_pid.clear();

        Ok(status.code().unwrap_or(-1))
    }
}

#[async_trait::async_trait]
impl EventRunner for ChildProcessRunner {
    async fn run_event(&self, ctx: EventRunContext<'_>) -> Result<EventOutcome, RunnerError> {
        let commands = self
            .events
            .commands_for(ctx.event_name)
            .ok_or_else(|| RunnerError::UnknownEvent(ctx.event_name.to_string()))?
            .to_vec();

        let mut children_count = 0u32;
        let mut exit_code = 0i32;

        for spec in &commands {
            if ctx.cancel.is_cancelled() {
                break;
            }
            exit_code = self
                .run_command(
                    ctx.dump_dir,
                    spec,
                    &ctx.extra_env,
                    &ctx.log,
                    &ctx.interactor,
                    &ctx.cancel,
                    ctx.event_name,
                )
                .await?;
            children_count += 1;
            if exit_code != 0 || ctx.cancel.is_cancelled() {
                break;
            }
        }

        Ok(EventOutcome { children_count, exit_code })
    }
}

fn parse_prompt_marker(line: &str) -> Option<(PromptKind, &str)> {
    for (prefix, kind) in [
        ("ASK_PASSWORD ", PromptKind::AskPassword),
        ("ASK_YES_NO_YESFOREVER ", PromptKind::AskYesNoYesForever),
        ("ASK_YES_NO_SAVE ", PromptKind::AskYesNoSave),
        ("ASK_YES_NO ", PromptKind::AskYesNo),
        ("ASK ", PromptKind::Ask),
    ] {
        if let Some(message) = line.strip_prefix(prefix) {
            return Some((kind, message));
        }
    }
    None
}

async fn write_prompt_reply(stdin: &mut tokio::process::ChildStdin, reply: &PromptReply) {
    let line = match reply {
        PromptReply::Text(text) => format!("{text}\n"),
        PromptReply::YesNo { response, remember } => format!("{response} {remember}\n"),
        PromptReply::Cancelled => "\n".to_string(),
    };
    let _ = stdin.write_all(line.as_bytes()).await;
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
