// SPDX-License-Identifier: MIT

//! In-memory stand-ins for the real bus, gated behind the `test-support`
//! feature: [`MockBus`] implements both [`BusClient`] and [`ObjectServer`],
//! and doubles as a fake `org.freedesktop.problems` peer exposing the
//! `Problems2`/`Session`/`Entry` surface described in spec §6.
//!
//! Wire conventions used here (there being no real D-Bus crate in the
//! dependency stack to dictate them) mirror D-Bus property-access idiom:
//! `GetSession`/`Authorize` on `Problems2`/`Session`, a `Get` method on
//! `org.freedesktop.DBus.Properties` for the cached `Elements` property, and
//! `ReadElements`/`SaveElements` on `Problems2.Entry` with handles carried
//! out-of-band in [`MethodReply::handles`] / the `handles` argument to
//! [`BusClient::call`].

use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use crate::object_server::{ObjectServer, SignalEmitter};
use crate::problems::{
    ENTRY_IFACE, PROBLEMS2_IFACE, PROBLEMS2_PATH, PROBLEMS_PEER, PROPERTIES_IFACE, SESSION_IFACE,
    SESSION_PATH,
};
use crate::transport::{BusClient, BusError, Handle, MethodCall, MethodReply};

/// One emitted signal, recorded for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSignal {
    pub path: String,
    pub name: String,
    pub body: serde_json::Value,
}

/// A fake `Problems2/Entry/<basename>`: its element set, as it would look on
/// the real problem-store peer.
#[derive(Debug, Clone, Default)]
pub struct EntryFixture {
    pub elements: HashMap<String, Vec<u8>>,
}

impl EntryFixture {
    pub fn with_elements<I, K, V>(elements: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        Self {
            elements: elements.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

struct MockBusState {
    entries: HashMap<String, EntryFixture>,
    authorize_code: i32,
    registered_objects: Vec<String>,
    signals: Vec<RecordedSignal>,
    read_elements_calls: Vec<(String, Vec<String>)>,
    save_elements_calls: Vec<(String, Vec<String>)>,
}

/// In-memory bus: a [`BusClient`] that answers problem-store calls out of
/// seeded [`EntryFixture`]s, and an [`ObjectServer`] that records
/// registrations and emitted signals instead of exporting anything real.
#[derive(Clone)]
pub struct MockBus {
    inner: Arc<Mutex<MockBusState>>,
}

impl Default for MockBus {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockBusState {
                entries: HashMap::new(),
                authorize_code: 0,
                registered_objects: Vec::new(),
                signals: Vec::new(),
                read_elements_calls: Vec::new(),
                save_elements_calls: Vec::new(),
            })),
        }
    }
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a fake entry at `/org/freedesktop/Problems2/Entry/<basename>`.
    pub fn with_entry(self, basename: impl Into<String>, fixture: EntryFixture) -> Self {
        self.inner.lock().entries.insert(basename.into(), fixture);
        self
    }

    /// Set the integer result `Authorize()` returns (spec §4.3: -1/0/1).
    pub fn set_authorize_code(&self, code: i32) {
        self.inner.lock().authorize_code = code;
    }

    /// Read back the current element set for an entry, e.g. after a push.
    pub fn entry_elements(&self, basename: &str) -> Option<HashMap<String, Vec<u8>>> {
        self.inner.lock().entries.get(basename).map(|e| e.elements.clone())
    }

    /// Names passed to each `ReadElements` call on `basename`, in call order.
    pub fn read_elements_batches(&self, basename: &str) -> Vec<Vec<String>> {
        self.inner
            .lock()
            .read_elements_calls
            .iter()
            .filter(|(b, _)| b == basename)
            .map(|(_, names)| names.clone())
            .collect()
    }

    /// Names passed to each `SaveElements` call on `basename`, in call order.
    pub fn save_elements_batches(&self, basename: &str) -> Vec<Vec<String>> {
        self.inner
            .lock()
            .save_elements_calls
            .iter()
            .filter(|(b, _)| b == basename)
            .map(|(_, names)| names.clone())
            .collect()
    }

    pub fn registered_objects(&self) -> Vec<String> {
        self.inner.lock().registered_objects.clone()
    }

    pub fn signals(&self) -> Vec<RecordedSignal> {
        self.inner.lock().signals.clone()
    }

    fn entry_basename(path: &str) -> Option<&str> {
        path.strip_prefix("/org/freedesktop/Problems2/Entry/")
    }
}

#[async_trait]
impl BusClient for MockBus {
    async fn call(&self, call: MethodCall, handles: Vec<Handle>) -> Result<MethodReply, BusError> {
        if call.destination != PROBLEMS_PEER {
            return Err(BusError::NoSuchPeer(call.destination));
        }

        match (call.interface.as_str(), call.method.as_str()) {
            (PROBLEMS2_IFACE, "GetSession") if call.path == PROBLEMS2_PATH => {
                Ok(MethodReply { body: json!({ "session_path": SESSION_PATH }), handles: Vec::new() })
            }
            (SESSION_IFACE, "Authorize") if call.path == SESSION_PATH => {
                let code = self.inner.lock().authorize_code;
                Ok(MethodReply { body: json!({ "code": code }), handles: Vec::new() })
            }
            (PROPERTIES_IFACE, "Get") => {
                let basename = Self::entry_basename(&call.path)
                    .ok_or_else(|| BusError::NoSuchObject(call.path.clone()))?;
                let state = self.inner.lock();
                let entry = state
                    .entries
                    .get(basename)
                    .ok_or_else(|| BusError::NoSuchObject(call.path.clone()))?;
                let mut names: Vec<&String> = entry.elements.keys().collect();
                names.sort();
                Ok(MethodReply { body: json!({ "value": names }), handles: Vec::new() })
            }
            (ENTRY_IFACE, "ReadElements") => {
                let basename = Self::entry_basename(&call.path)
                    .ok_or_else(|| BusError::NoSuchObject(call.path.clone()))?
                    .to_string();
                let names: Vec<String> = serde_json::from_value(
                    call.body.get("names").cloned().unwrap_or_default(),
                )
                .map_err(|e| BusError::CallFailed(e.to_string()))?;

                let mut state = self.inner.lock();
                let entry = state
                    .entries
                    .get(&basename)
                    .ok_or_else(|| BusError::NoSuchObject(call.path.clone()))?
                    .clone();

                let mut reply_handles = Vec::with_capacity(names.len());
                let mut index_by_name = serde_json::Map::new();
                for name in &names {
                    let content = entry
                        .elements
                        .get(name)
                        .ok_or_else(|| BusError::CallFailed(format!("no such element: {name}")))?;
                    let mut file = tempfile::tempfile()
                        .map_err(|e| BusError::CallFailed(e.to_string()))?;
                    file.write_all(content).map_err(|e| BusError::CallFailed(e.to_string()))?;
                    file.seek(SeekFrom::Start(0)).map_err(|e| BusError::CallFailed(e.to_string()))?;
                    index_by_name.insert(name.clone(), json!(reply_handles.len()));
                    reply_handles.push(file);
                }
                state.read_elements_calls.push((basename, names));

                Ok(MethodReply {
                    body: json!({ "handles": serde_json::Value::Object(index_by_name) }),
                    handles: reply_handles,
                })
            }
            (ENTRY_IFACE, "SaveElements") => {
                let basename = Self::entry_basename(&call.path)
                    .ok_or_else(|| BusError::NoSuchObject(call.path.clone()))?
                    .to_string();
                let index_by_name: HashMap<String, usize> = serde_json::from_value(
                    call.body.get("names").cloned().unwrap_or_default(),
                )
                .map_err(|e| BusError::CallFailed(e.to_string()))?;

                let mut state = self.inner.lock();
                let mut names: Vec<String> = Vec::with_capacity(index_by_name.len());
                let entry = state.entries.entry(basename.clone()).or_default();
                for (name, index) in &index_by_name {
                    let mut file = handles
                        .get(*index)
                        .ok_or(BusError::HandleOutOfRange { index: *index, attached: handles.len() })?
                        .try_clone()
                        .map_err(|e| BusError::CallFailed(e.to_string()))?;
                    file.seek(SeekFrom::Start(0)).map_err(|e| BusError::CallFailed(e.to_string()))?;
                    let mut content = Vec::new();
                    file.read_to_end(&mut content).map_err(|e| BusError::CallFailed(e.to_string()))?;
                    entry.elements.insert(name.clone(), content);
                    names.push(name.clone());
                }
                state.save_elements_calls.push((basename, names));

                Ok(MethodReply { body: json!({}), handles: Vec::new() })
            }
            _ => Err(BusError::NoSuchObject(call.path)),
        }
    }
}

impl ObjectServer for MockBus {
    fn register_object(&self, path: &str) -> Result<SignalEmitter, BusError> {
        self.inner.lock().registered_objects.push(path.to_string());
        let inner = self.inner.clone();
        Ok(SignalEmitter::new(
            path,
            Arc::new(move |path, name, body| {
                inner.lock().signals.push(RecordedSignal {
                    path: path.to_string(),
                    name: name.to_string(),
                    body,
                });
            }),
        ))
    }

    fn unregister_object(&self, path: &str) {
        self.inner.lock().registered_objects.retain(|p| p != path);
    }
}
