// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! reportd-cache: the problem materialisation cache (spec §4.1). Pulls a
//! problem-store entry's elements into a local working directory and later
//! pushes mutated, non-ignored elements back.

pub mod cache;
pub mod element_value;

pub use cache::{ensure_cache_root, ProblemCache, BATCH_SIZE};
pub use element_value::{parse_element_value, ElementValue};
