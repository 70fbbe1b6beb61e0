// SPDX-License-Identifier: MIT

//! [`ProblemRef`] — an opaque object path issued by the problem store.
//!
//! The only part of the path the core ever uses is its *basename* (the last
//! `/`-separated segment), which becomes the local directory name under
//! `cache_root`. See spec §3 "ProblemEntryRef".

use std::fmt;

/// Well-known object path of the problem store's root object.
pub const PROBLEMS2_ROOT: &str = "/org/freedesktop/Problems2";

/// Base path under which problem-store entries live.
pub const PROBLEMS2_ENTRY_BASE: &str = "/org/freedesktop/Problems2/Entry";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProblemRefError {
    #[error("problem entry path has an empty basename")]
    EmptyBasename,
    #[error("problem entry basename `.` is reserved")]
    DotBasename,
    #[error("problem entry basename `..` would escape the cache root")]
    ParentBasename,
}

/// An opaque problem-store entry path, e.g. `/org/freedesktop/Problems2/Entry/42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ProblemRef(String);

impl ProblemRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path segment, validated against spec §4.1 step 2: empty,
    /// `.`, or `..` basenames are rejected. `..` is as dangerous as `.` here
    /// — joined onto `cache_root` it resolves to `cache_root`'s *parent*,
    /// escaping it entirely rather than merely aliasing it (the single
    /// `candidate == cache_root` guard in `reportd-cache` does not catch
    /// this case, so it must be rejected here). Matches
    /// `original_source/src/reportd-daemon.c`'s
    /// `g_canonicalize_filename` + `g_path_get_basename` sequence.
    pub fn basename(&self) -> Result<&str, ProblemRefError> {
        let name = self.0.rsplit('/').next().unwrap_or("");
        if name.is_empty() {
            return Err(ProblemRefError::EmptyBasename);
        }
        if name == "." {
            return Err(ProblemRefError::DotBasename);
        }
        if name == ".." {
            return Err(ProblemRefError::ParentBasename);
        }
        Ok(name)
    }

    /// Build the canonical entry object path for a given basename, as used
    /// when [`reportd-cache`] pushes mutations back (spec §4.1 step 2).
    pub fn entry_path_for_basename(basename: &str) -> String {
        format!("{PROBLEMS2_ENTRY_BASE}/{basename}")
    }
}

impl fmt::Display for ProblemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProblemRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ProblemRef {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
