// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! reportd-bus: the narrow contract spec.md §1 keeps "deliberately out of
//! scope" — connection setup, name ownership, and method-dispatch glue for
//! the real message bus are a collaborator's problem. This crate only
//! states what the core needs from that collaborator:
//!
//! - [`BusClient`]: call a remote method with a request body and optional
//!   attached handles, get back a response body plus returned handles.
//! - [`ObjectServer`]: register/unregister an exported object at a path,
//!   and emit signals on it via the [`SignalEmitter`] handle returned at
//!   registration time.
//!
//! The length-prefixed JSON framing in [`wire`] is the concrete encoding
//! the in-memory test transport (`test-support` feature) and any real
//! adapter built against these traits would use on the wire.

pub mod object_server;
pub mod problems;
pub mod transport;
pub mod wire;

#[cfg(feature = "test-support")]
pub mod mock;

pub use object_server::{uniquify_path, ObjectServer, SignalEmitter};
pub use transport::{BusClient, BusError, Handle, MethodCall, MethodReply};
pub use wire::{decode, encode, read_message, write_message, ProtocolError};
