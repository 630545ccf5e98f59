// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sl-core: Core library for the storeline launch orchestrator
//!
//! This crate provides:
//! - Pure state machines for workflow instances, stages, handoffs, and
//!   support sessions
//! - The escalation policy (tier thresholds + cooldown)
//! - Validated launch configuration
//! - Contracts for storage (`WorkflowStore`) and delivery (`Notifier`)

pub mod clock;
pub mod id;

pub mod config;
pub mod notify;
pub mod store;
pub mod template;

// State machines and domain records (order matters for dependencies)
pub mod roster;
pub mod stage;
pub mod handoff;
pub mod support;
pub mod escalation;
pub mod event;
pub mod error;
pub mod workflow;

pub mod compose;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use compose::{
    DefaultComposer, EscalationContext, MessageComposer, OverdueRiskScorer, RiskLevel, RiskScorer,
};
pub use config::{ConfigError, EscalationConfig, LaunchConfig, SweepConfig};
pub use error::EngineError;
pub use escalation::{
    DeliveryStatus, EscalationPolicy, EscalationRecord, RecipientRole, TierRoute, TierThreshold,
};
pub use event::{DueDateChange, Event};
pub use handoff::{Checkpoint, HandoffRecord, MaterialLocation};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use notify::{Channel, Delivery, Notifier};
pub use roster::{Contact, Role, Roster};
pub use stage::{StageRecord, StageStatus};
pub use store::{StoreError, WorkflowStore};
pub use support::SupportSession;
pub use template::{StageTemplate, StageTemplateTable, TemplateError};
pub use workflow::{WorkflowId, WorkflowInstance, WorkflowStatus};
