// SPDX-License-Identifier: MIT

//! reportd-daemon: process-scope glue (spec §4.4) — CLI flag parsing,
//! `XDG_RUNTIME_DIR`/config-dir resolution, and the `Daemon` context that
//! owns the bus handles, the exported-object registry, and the `Service`
//! instance built from them. Grounded on the teacher's
//! `oj-daemon::lifecycle`/`oj-daemon::env` shape, generalized from a
//! socket-bound job daemon to a bus-bound reporting daemon.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod cli;
pub mod daemon;
pub mod env;
pub mod logging;

pub use cli::{BusKind, Cli};
pub use daemon::{Daemon, DaemonError};
