// SPDX-License-Identifier: MIT

//! The remote-method-call side of the bus contract.

use std::fs::File;

/// An owned handle attached to a call or reply, standing in for a real file
/// descriptor transferred alongside a bus message (spec §6: `ReadElements`/
/// `SaveElements` exchange file contents this way, batched 16 per call).
pub type Handle = File;

/// A request to invoke `method` on `interface` at `path`, owned by
/// `destination` (the bus peer name, e.g. `org.freedesktop.problems`).
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub destination: String,
    pub path: String,
    pub interface: String,
    pub method: String,
    pub body: serde_json::Value,
}

impl MethodCall {
    pub fn new(
        destination: impl Into<String>,
        path: impl Into<String>,
        interface: impl Into<String>,
        method: impl Into<String>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            destination: destination.into(),
            path: path.into(),
            interface: interface.into(),
            method: method.into(),
            body,
        }
    }
}

/// The reply to a [`MethodCall`].
#[derive(Debug, Default)]
pub struct MethodReply {
    pub body: serde_json::Value,
    pub handles: Vec<Handle>,
}

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("no such peer: {0}")]
    NoSuchPeer(String),

    #[error("no such object: {0}")]
    NoSuchObject(String),

    #[error("method call failed: {0}")]
    CallFailed(String),

    #[error("handle index {index} out of range (attached {attached})")]
    HandleOutOfRange { index: usize, attached: usize },
}

/// "Call a remote method with a request variant and optional attached file
/// descriptors, and receive a response variant plus returned file
/// descriptors" (spec §1). Implemented by a real D-Bus-backed client in
/// production, and by [`crate::mock::MockBus`] in tests.
#[async_trait::async_trait]
pub trait BusClient: Send + Sync {
    async fn call(&self, call: MethodCall, handles: Vec<Handle>) -> Result<MethodReply, BusError>;
}
