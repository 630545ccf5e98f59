// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Launch workflow engine

mod engine;
mod sweeper;

pub use engine::{EngineDeps, LaunchRules, WorkflowEngine};
pub use sweeper::{SweepReport, Sweeper};
