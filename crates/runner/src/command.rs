// SPDX-License-Identifier: MIT

//! The event-to-commands table: which child processes `report_uReport`,
//! `report_bugzilla`, etc. actually run. spec §1 puts "workflow configuration
//! loading" out of scope for the *workflow* (`name -> [event_name]`)
//! descriptor, but the event table (`event_name -> [command]`) is a distinct,
//! ambient piece of configuration the runner needs to do anything at all —
//! loaded the same way, and for the same reason, as `reportd_core::Workflow`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

/// One child process to spawn for an event, in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct EventDescriptor {
    name: String,
    commands: Vec<CommandSpec>,
}

#[derive(Debug, thiserror::Error)]
pub enum EventTableLoadError {
    #[error("reading event directory {path}: {source}")]
    ReadDir { path: String, #[source] source: std::io::Error },
    #[error("reading event descriptor {path}: {source}")]
    ReadFile { path: String, #[source] source: std::io::Error },
    #[error("parsing event descriptor {path}: {source}")]
    Parse { path: String, #[source] source: toml::de::Error },
    #[error("duplicate event name `{0}`")]
    Duplicate(String),
}

/// `event_name -> ordered commands`. Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    by_name: HashMap<String, Vec<CommandSpec>>,
}

impl EventTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load_dir(dir: &Path) -> Result<Self, EventTableLoadError> {
        let mut by_name = HashMap::new();
        let entries = std::fs::read_dir(dir).map_err(|source| EventTableLoadError::ReadDir {
            path: dir.display().to_string(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| EventTableLoadError::ReadDir {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let contents = std::fs::read_to_string(&path).map_err(|source| {
                EventTableLoadError::ReadFile { path: path.display().to_string(), source }
            })?;
            let descriptor: EventDescriptor = toml::from_str(&contents).map_err(|source| {
                EventTableLoadError::Parse { path: path.display().to_string(), source }
            })?;
            if by_name.insert(descriptor.name.clone(), descriptor.commands).is_some() {
                return Err(EventTableLoadError::Duplicate(descriptor.name));
            }
        }
        Ok(Self { by_name })
    }

    pub fn insert(&mut self, event_name: impl Into<String>, commands: Vec<CommandSpec>) {
        self.by_name.insert(event_name.into(), commands);
    }

    pub fn commands_for(&self, event_name: &str) -> Option<&[CommandSpec]> {
        self.by_name.get(event_name).map(Vec::as_slice)
    }

    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_event(dir: &Path, file: &str, toml: &str) {
        let mut f = std::fs::File::create(dir.join(file)).expect("create");
        f.write_all(toml.as_bytes()).expect("write");
    }

    #[test]
    fn loads_every_toml_file_keyed_by_event_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_event(
            dir.path(),
            "ureport.toml",
            r#"
            name = "report_uReport"
            [[commands]]
            program = "reporter-ureport"
            args = ["-d", "$DUMP_DIR"]
            "#,
        );
        let table = EventTable::load_dir(dir.path()).expect("load");
        let commands = table.commands_for("report_uReport").expect("commands");
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].program, "reporter-ureport");
    }

    #[test]
    fn missing_event_lookup_is_none() {
        let table = EventTable::empty();
        assert!(table.commands_for("nope").is_none());
    }

    #[test]
    fn duplicate_event_name_across_files_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_event(dir.path(), "a.toml", "name = \"x\"\ncommands = []\n");
        write_event(dir.path(), "b.toml", "name = \"x\"\ncommands = []\n");
        let err = EventTable::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, EventTableLoadError::Duplicate(_)));
    }
}
