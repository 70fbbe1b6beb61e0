// SPDX-License-Identifier: MIT

//! The exported-object side of the bus contract: "register/unregister an
//! exported object at a chosen path" (spec §1), plus the ability to emit
//! signals on it for as long as it stays registered.
//!
//! Per REDESIGN FLAGS, this deliberately avoids an inheritance hierarchy of
//! skeleton classes: an exported object is just data (a `Task`, a `Prompt`)
//! plus this thin adapter for the one thing every bus object needs —
//! emitting a signal under its own path.

use std::sync::Arc;

use crate::transport::BusError;

/// Handle returned by [`ObjectServer::register_object`]; the only way
/// callers emit signals on the object they just registered.
#[derive(Clone)]
pub struct SignalEmitter {
    path: String,
    emit: Arc<dyn Fn(&str, &str, serde_json::Value) + Send + Sync>,
}

impl SignalEmitter {
    pub fn new(
        path: impl Into<String>,
        emit: Arc<dyn Fn(&str, &str, serde_json::Value) + Send + Sync>,
    ) -> Self {
        Self { path: path.into(), emit }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn emit(&self, signal_name: &str, body: serde_json::Value) {
        (self.emit)(&self.path, signal_name, body);
    }
}

/// "Register/unregister an exported object at a chosen path" (spec §1).
pub trait ObjectServer: Send + Sync {
    fn register_object(&self, path: &str) -> Result<SignalEmitter, BusError>;
    fn unregister_object(&self, path: &str);
}

/// Append a short random suffix to a base path, so two tasks (or prompts)
/// created from the same base never collide on the bus (spec §3 "Task":
/// "registered on the bus with a unique suffix").
pub fn uniquify_path(base: &str) -> String {
    format!("{base}/{}", nanoid::nanoid!(12))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniquify_path_is_distinct_per_call() {
        let a = uniquify_path("/org/freedesktop/reportd/Task");
        let b = uniquify_path("/org/freedesktop/reportd/Task");
        assert_ne!(a, b);
        assert!(a.starts_with("/org/freedesktop/reportd/Task/"));
    }
}
