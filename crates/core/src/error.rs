// SPDX-License-Identifier: MIT

//! Error taxonomy shared across the orchestration core (spec §7).
//!
//! Each downstream crate converts into these with `#[from]` at its own
//! boundary rather than inventing parallel error kinds, so a caller three
//! layers up can still match on `CacheError::PathEscapesCacheRoot` etc.

use crate::problem::ProblemRefError;

/// Errors from [`reportd-cache`]'s pull/push of a working directory.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("bus transport error: {0}")]
    BusTransport(String),

    #[error("problem store returned malformed data: {0}")]
    Store(String),

    #[error("invalid problem reference: {0}")]
    InvalidRef(#[from] ProblemRefError),

    #[error("working directory path escapes cache root")]
    PathEscapesCacheRoot,

    #[error("local cache I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from one [`reportd-engine`] task run (spec §4.2, §7).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("event `{event}` exited with code {code}")]
    EventHandlerFailed { event: String, code: i32 },

    #[error("event `{event}` registered no handlers")]
    NoEventHandlers { event: String },

    #[error("event runner error: {0}")]
    Runner(String),

    #[error("task was cancelled")]
    Cancelled,

    #[error("task is not in READY state")]
    NotReady,
}

/// Errors surfaced to bus callers by [`reportd-service`] (spec §4.3, §7).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("unknown workflow `{0}`")]
    UnknownWorkflow(String),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("authorization failed")]
    AuthorizationFailed,

    #[error("authorization request already pending")]
    AuthorizationPending,

    #[error("authorization lost")]
    AuthorizationLost,

    #[error("bus transport error: {0}")]
    BusTransport(String),
}

impl EngineError {
    /// Cancellation dominates all other pending errors (spec §4.2 step 6,
    /// §7 propagation policy).
    pub fn prefer_cancelled(self, cancelled: bool) -> Self {
        if cancelled {
            EngineError::Cancelled
        } else {
            self
        }
    }
}
