// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! reportd-service: the bus-facing `Service` façade (spec §4.3) —
//! `GetWorkflows`, `CreateTask`, `AuthorizeProblemsSession` — and the
//! `PeerTaskRegistry` that ties a task's lifetime to its requesting bus
//! peer.

pub mod authorize;
pub mod registry;
pub mod service;

pub use authorize::AuthorizeSession;
pub use registry::{PeerTaskRegistry, TaskHandle};
pub use service::{RunnerBuilder, Service, TASK_BASE_PATH};
