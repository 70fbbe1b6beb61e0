// SPDX-License-Identifier: MIT

//! Tracing setup, exactly the `tracing`/`tracing-subscriber` (env-filter)
//! stack the teacher's own `oj-daemon` binary initializes from.

use tracing_subscriber::EnvFilter;

/// Install a `tracing-subscriber` fmt layer honoring `RUST_LOG`, defaulting
/// to `info` when unset. Call once, before `Daemon::connect`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
