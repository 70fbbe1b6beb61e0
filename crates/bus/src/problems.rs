// SPDX-License-Identifier: MIT

//! Names for the remote interfaces consumed on the problem-store peer
//! (spec §6): `org.freedesktop.problems`'s `Problems2`, `Session`, and
//! `Entry` objects. Shared by production callers (`reportd-cache`,
//! `reportd-service`) and by [`crate::mock::MockBus`].

pub const PROBLEMS_PEER: &str = "org.freedesktop.problems";
pub const PROBLEMS2_PATH: &str = "/org/freedesktop/Problems2";
pub const PROBLEMS2_IFACE: &str = "org.freedesktop.Problems2";
pub const SESSION_PATH: &str = "/org/freedesktop/Problems2/Session";
pub const SESSION_IFACE: &str = "org.freedesktop.Problems2.Session";
pub const ENTRY_IFACE: &str = "org.freedesktop.Problems2.Entry";
pub const PROPERTIES_IFACE: &str = "org.freedesktop.DBus.Properties";
