// SPDX-License-Identifier: MIT

//! Environment-driven configuration for the daemon crate (spec §6), in the
//! `VAR > XDG > default` style of the teacher's own `env` module.

use std::path::PathBuf;

use crate::daemon::DaemonError;

/// Cache root: `<user runtime dir>/reportd` (spec §6). There is no sensible
/// fallback for a missing `XDG_RUNTIME_DIR` — a session without one has no
/// private per-user runtime tree to stage working directories in.
pub fn cache_root() -> Result<PathBuf, DaemonError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").map_err(|_| DaemonError::NoRuntimeDir)?;
    Ok(PathBuf::from(runtime_dir).join("reportd"))
}

/// Directory workflow descriptors are loaded from: `REPORTD_CONFIG_DIR`, or
/// `<XDG config dir>/reportd/workflows`.
pub fn workflows_dir() -> PathBuf {
    config_dir().join("workflows")
}

/// Directory event-table descriptors are loaded from:
/// `<XDG config dir>/reportd/events`.
pub fn events_dir() -> PathBuf {
    config_dir().join("events")
}

fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REPORTD_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("reportd")
}
