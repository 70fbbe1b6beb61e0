// SPDX-License-Identifier: MIT

//! [`ProblemCache`]: pull (store → local) and push (local → store) of a
//! problem entry's elements (spec §4.1).

use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reportd_bus::{BusClient, MethodCall};
use reportd_core::{is_ignored_element, CacheError, ProblemRef};
use serde_json::json;

use reportd_bus::problems::{ENTRY_IFACE, PROBLEMS_PEER, PROPERTIES_IFACE};

use crate::element_value::{parse_element_value, ElementValue};

/// Message-bus fd-per-message ceiling (spec §4.1 steps 6, 4).
pub const BATCH_SIZE: usize = 16;

/// Owns `cache_root` and translates between problem-store entry references
/// and local working directories (spec §4.1).
pub struct ProblemCache<B: BusClient> {
    cache_root: PathBuf,
    bus: Arc<B>,
}

impl<B: BusClient> ProblemCache<B> {
    pub fn new(cache_root: PathBuf, bus: Arc<B>) -> Self {
        Self { cache_root, bus }
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// spec §4.1 `get_working_directory`.
    pub async fn get_working_directory(&self, entry: &ProblemRef) -> Result<PathBuf, CacheError> {
        let basename = entry.basename()?;
        let candidate = self.cache_root.join(basename);
        if candidate == self.cache_root {
            return Err(CacheError::PathEscapesCacheRoot);
        }

        if candidate.is_dir() {
            return Ok(candidate);
        }

        let names = self.read_elements_property(entry).await?;

        create_private_dir(&candidate)?;

        for batch in names.chunks(BATCH_SIZE) {
            self.pull_batch(entry, batch, &candidate).await?;
        }

        Ok(candidate)
    }

    /// spec §4.1 `push_working_directory`.
    pub async fn push_working_directory(&self, path: &Path) -> Result<(), CacheError> {
        match path.parent() {
            Some(parent) if parent == self.cache_root => {}
            _ => return Err(CacheError::PathEscapesCacheRoot),
        }
        let basename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or(CacheError::PathEscapesCacheRoot)?;
        let entry_path = ProblemRef::entry_path_for_basename(basename);

        let mut names = Vec::new();
        let entries = std::fs::read_dir(path).map_err(|source| CacheError::Io {
            path: path.display().to_string(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| CacheError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_ignored_element(&name) {
                continue;
            }
            names.push(name);
        }

        for batch in names.chunks(BATCH_SIZE) {
            self.push_batch(&entry_path, path, batch).await;
        }

        Ok(())
    }

    async fn read_elements_property(&self, entry: &ProblemRef) -> Result<Vec<String>, CacheError> {
        let call = MethodCall::new(
            PROBLEMS_PEER,
            entry.as_str(),
            PROPERTIES_IFACE,
            "Get",
            json!({ "property": "Elements" }),
        );
        let reply = self
            .bus
            .call(call, Vec::new())
            .await
            .map_err(|err| CacheError::BusTransport(err.to_string()))?;
        let value = reply
            .body
            .get("value")
            .ok_or_else(|| CacheError::Store("missing Elements property".to_string()))?;
        serde_json::from_value(value.clone()).map_err(|err| CacheError::Store(err.to_string()))
    }

    async fn pull_batch(
        &self,
        entry: &ProblemRef,
        names: &[String],
        candidate: &Path,
    ) -> Result<(), CacheError> {
        let call = MethodCall::new(
            PROBLEMS_PEER,
            entry.as_str(),
            ENTRY_IFACE,
            "ReadElements",
            json!({ "names": names, "flags": 1 }),
        );
        let reply = self
            .bus
            .call(call, Vec::new())
            .await
            .map_err(|err| CacheError::BusTransport(err.to_string()))?;
        let handles_map = reply
            .body
            .get("handles")
            .and_then(|v| v.as_object())
            .ok_or_else(|| CacheError::Store("ReadElements reply missing `handles`".to_string()))?;

        for name in names {
            let raw = handles_map
                .get(name)
                .ok_or_else(|| CacheError::Store(format!("no reply entry for element `{name}`")))?;
            let target = candidate.join(name);
            let ElementValue::Handle(index) = parse_element_value(name, raw)?;
            let handle = reply.handles.get(index).ok_or_else(|| {
                CacheError::Store(format!(
                    "fd index {index} out of range for element `{name}` ({} attached)",
                    reply.handles.len()
                ))
            })?;
            let mut source = handle.try_clone().map_err(|source| CacheError::Io {
                path: target.display().to_string(),
                source,
            })?;
            let _ = source.seek(SeekFrom::Start(0));
            let mut dest = std::fs::File::create(&target).map_err(|source| CacheError::Io {
                path: target.display().to_string(),
                source,
            })?;
            std::io::copy(&mut source, &mut dest).map_err(|source| CacheError::Io {
                path: target.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    async fn push_batch(&self, entry_path: &str, dir: &Path, names: &[String]) {
        let mut handles = Vec::with_capacity(names.len());
        let mut index_by_name = serde_json::Map::new();

        for name in names {
            let file_path = dir.join(name);
            match std::fs::File::open(&file_path) {
                Ok(file) => {
                    index_by_name.insert(name.clone(), json!(handles.len()));
                    handles.push(file);
                }
                Err(err) => {
                    tracing::warn!(
                        element = %name,
                        path = %file_path.display(),
                        error = %err,
                        "skipping element: failed to open for push"
                    );
                }
            }
        }

        if index_by_name.is_empty() {
            return;
        }

        let call = MethodCall::new(
            PROBLEMS_PEER,
            entry_path,
            ENTRY_IFACE,
            "SaveElements",
            json!({ "names": serde_json::Value::Object(index_by_name), "flags": 0 }),
        );
        if let Err(err) = self.bus.call(call, handles).await {
            tracing::warn!(entry = %entry_path, error = %err, "SaveElements batch failed, continuing with next batch");
        }
    }
}

/// Create one entry's working directory with mode 0600 (spec §4.1 step 5),
/// distinct from `cache_root`'s own 0700 — the skeleton directory holds
/// element files readable only by their owner, not traversable group/world.
fn create_private_dir(path: &Path) -> Result<(), CacheError> {
    std::fs::create_dir(path).map_err(|source| CacheError::Io {
        path: path.display().to_string(),
        source,
    })?;
    chmod(path, 0o600)
}

/// Create `cache_root` itself with mode 0700 if it does not already exist
/// (spec §4.1: "a per-user runtime directory, created with mode 0700").
/// Idempotent, so the daemon can call this unconditionally at startup.
pub fn ensure_cache_root(path: &Path) -> Result<(), CacheError> {
    std::fs::create_dir_all(path).map_err(|source| CacheError::Io {
        path: path.display().to_string(),
        source,
    })?;
    chmod(path, 0o700)
}

#[cfg(unix)]
fn chmod(path: &Path, mode: u32) -> Result<(), CacheError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|source| CacheError::Io { path: path.display().to_string(), source })
}

#[cfg(not(unix))]
fn chmod(_path: &Path, _mode: u32) -> Result<(), CacheError> {
    Ok(())
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
