// SPDX-License-Identifier: MIT

//! The set of problem elements that are store-owned metadata and must never
//! be pushed back by [`reportd-cache`](../../cache).

/// Elements the store considers its own metadata, never written back.
pub const IGNORED_ELEMENTS: &[&str] = &["analyzer", "type", "time", "count"];

/// Returns true if `name` is one of [`IGNORED_ELEMENTS`].
pub fn is_ignored_element(name: &str) -> bool {
    IGNORED_ELEMENTS.contains(&name)
}
