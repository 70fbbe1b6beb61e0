// SPDX-License-Identifier: MIT

//! `AuthorizeProblemsSession` (spec §4.3): the authorisation handshake
//! against the problem store's per-peer `Session` object.
//!
//! There is no signal-subscription mechanism on [`reportd_bus::BusClient`]
//! (spec §1 keeps bus connection setup, and therefore signal delivery, out
//! of scope) to genuinely wait on a remote `AuthorizationChanged` signal.
//! [`AuthorizeSession`] models the pending case (`Authorize()` returning
//! `1`) with a one-shot channel instead, and exposes
//! [`authorization_changed`](AuthorizeSession::authorization_changed) as the
//! seam whatever owns the system-bus connection must call on the real
//! signal — the same pattern as `PromptStation::commit` and
//! `PeerTaskRegistry::peer_vanished`.

use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::oneshot;

use reportd_bus::problems::{PROBLEMS2_IFACE, PROBLEMS2_PATH, PROBLEMS_PEER, SESSION_IFACE};
use reportd_bus::{BusClient, MethodCall};
use reportd_core::ServiceError;

/// Caches the `Session` proxy path and tracks at most one pending
/// `Authorize()` request (spec §4.3 step 1-2: "cache the proxy", "subscribe
/// a one-shot signal handler").
#[derive(Default)]
pub struct AuthorizeSession {
    session_path: Mutex<Option<String>>,
    pending: Mutex<Option<oneshot::Sender<i32>>>,
}

impl AuthorizeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the handshake against `bus` (spec §4.3 steps 1-4).
    pub async fn authorize<B: BusClient>(&self, bus: &B, flags: i32) -> Result<(), ServiceError> {
        let session_path = self.ensure_session(bus).await?;
        let reply = bus
            .call(
                MethodCall::new(PROBLEMS_PEER, &session_path, SESSION_IFACE, "Authorize", json!({ "flags": flags })),
                Vec::new(),
            )
            .await
            .map_err(|err| ServiceError::BusTransport(err.to_string()))?;
        let code = reply.body["code"].as_i64().unwrap_or(-1);

        match code {
            -1 => Err(ServiceError::AuthorizationFailed),
            0 => Ok(()),
            2 => Err(ServiceError::AuthorizationPending),
            1 => {
                let (tx, rx) = oneshot::channel();
                *self.pending.lock() = Some(tx);
                let status = rx.await.unwrap_or(-1);
                *self.pending.lock() = None;
                if status == 0 {
                    Ok(())
                } else {
                    Err(ServiceError::AuthorizationLost)
                }
            }
            other => Err(ServiceError::BusTransport(format!("unexpected Authorize() code {other}"))),
        }
    }

    /// Deliver `AuthorizationChanged(status)` for the pending request, if
    /// any. Returns `false` if nothing was pending (spec §4.3 step 4:
    /// "disconnect the signal handler after the reply is sent" — a late or
    /// duplicate signal after that point is simply ignored here).
    pub fn authorization_changed(&self, status: i32) -> bool {
        match self.pending.lock().take() {
            Some(tx) => tx.send(status).is_ok(),
            None => false,
        }
    }

    async fn ensure_session<B: BusClient>(&self, bus: &B) -> Result<String, ServiceError> {
        if let Some(path) = self.session_path.lock().clone() {
            return Ok(path);
        }
        let reply = bus
            .call(MethodCall::new(PROBLEMS_PEER, PROBLEMS2_PATH, PROBLEMS2_IFACE, "GetSession", json!({})), Vec::new())
            .await
            .map_err(|err| ServiceError::BusTransport(err.to_string()))?;
        let path = reply.body["session_path"]
            .as_str()
            .ok_or_else(|| ServiceError::BusTransport("GetSession reply missing session_path".to_string()))?
            .to_string();
        *self.session_path.lock() = Some(path.clone());
        Ok(path)
    }
}

#[cfg(test)]
#[path = "authorize_tests.rs"]
mod tests;
