// SPDX-License-Identifier: MIT

//! Workflow catalogue: immutable records loaded once at startup and never
//! mutated afterward (spec §3 "Workflow", §4.3).
//!
//! The on-disk descriptor format itself is out of scope for spec.md (§1);
//! this loader is the ambient configuration-loading stack SPEC_FULL.md adds
//! so the daemon can actually start. One `.toml` file per workflow, in the
//! style the teacher's own `oj-runbook` loader reads one file per runbook.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

/// An immutable, loaded-once workflow record (spec §3 "Workflow").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Workflow {
    pub name: String,
    pub screen_name: String,
    #[serde(default)]
    pub description: String,
    pub events: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowLoadError {
    #[error("reading workflow directory {path}: {source}")]
    ReadDir { path: String, #[source] source: std::io::Error },
    #[error("reading workflow descriptor {path}: {source}")]
    ReadFile { path: String, #[source] source: std::io::Error },
    #[error("parsing workflow descriptor {path}: {source}")]
    Parse { path: String, #[source] source: toml::de::Error },
    #[error("duplicate workflow name `{0}`")]
    Duplicate(String),
}

/// Read-only after construction (spec §4.3: "The catalogue is read-only
/// after init; shared freely").
#[derive(Debug, Clone, Default)]
pub struct WorkflowCatalogue {
    by_name: HashMap<String, Workflow>,
}

impl WorkflowCatalogue {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every `*.toml` file in `dir` into the catalogue, keyed by
    /// `Workflow::name`.
    pub fn load_dir(dir: &Path) -> Result<Self, WorkflowLoadError> {
        let mut by_name = HashMap::new();
        let entries = std::fs::read_dir(dir).map_err(|source| WorkflowLoadError::ReadDir {
            path: dir.display().to_string(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| WorkflowLoadError::ReadDir {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let contents = std::fs::read_to_string(&path).map_err(|source| {
                WorkflowLoadError::ReadFile { path: path.display().to_string(), source }
            })?;
            let workflow: Workflow = toml::from_str(&contents).map_err(|source| {
                WorkflowLoadError::Parse { path: path.display().to_string(), source }
            })?;
            if by_name.insert(workflow.name.clone(), workflow).is_some() {
                return Err(WorkflowLoadError::Duplicate(
                    by_name.keys().last().cloned().unwrap_or_default(),
                ));
            }
        }
        Ok(Self { by_name })
    }

    pub fn get(&self, name: &str) -> Option<&Workflow> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workflow> {
        self.by_name.values()
    }

    pub fn insert(&mut self, workflow: Workflow) {
        self.by_name.insert(workflow.name.clone(), workflow);
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_workflow(dir: &Path, file: &str, toml: &str) {
        let mut f = std::fs::File::create(dir.join(file)).expect("create");
        f.write_all(toml.as_bytes()).expect("write");
    }

    #[test]
    fn loads_every_toml_file_keyed_by_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_workflow(
            dir.path(),
            "bugzilla.toml",
            r#"
            name = "report_bugzilla"
            screen_name = "Report to Bugzilla"
            events = ["collect_xsession_errors", "report_bugzilla"]
            "#,
        );
        write_workflow(
            dir.path(),
            "ureport.toml",
            r#"
            name = "report_uReport"
            screen_name = "Report uReport"
            events = ["report_uReport"]
            "#,
        );
        let catalogue = WorkflowCatalogue::load_dir(dir.path()).expect("load");
        assert_eq!(catalogue.len(), 2);
        assert!(catalogue.contains("report_bugzilla"));
        assert_eq!(catalogue.get("report_uReport").unwrap().events, vec!["report_uReport"]);
    }

    #[test]
    fn ignores_non_toml_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_workflow(dir.path(), "README.md", "not a workflow");
        let catalogue = WorkflowCatalogue::load_dir(dir.path()).expect("load");
        assert!(catalogue.is_empty());
    }

    #[test]
    fn unknown_name_lookup_is_none() {
        let catalogue = WorkflowCatalogue::empty();
        assert!(catalogue.get("nope").is_none());
    }
}
