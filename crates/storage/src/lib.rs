// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sl-storage: Durable storage backends for workflow instances
//!
//! [`JsonStore`] is the production backend (one JSON document per
//! instance, compare-and-swap saves). [`MemoryStore`] is a drop-in for
//! tests, available behind the `test-support` feature.

pub mod json;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use json::JsonStore;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
