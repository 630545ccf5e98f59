// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events emitted by workflow transitions
//!
//! Events flow one way out of the engine: transitions return them, the
//! engine persists state first and then turns them into best-effort
//! notifications.

use crate::handoff::{Checkpoint, MaterialLocation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A due-date shift recorded by a reschedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDateChange {
    pub stage_number: u32,
    pub old_due_at: DateTime<Utc>,
    pub new_due_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    StageStarted {
        workflow_id: String,
        stage_number: u32,
        name: String,
        due_at: DateTime<Utc>,
    },
    StageCompleted {
        workflow_id: String,
        stage_number: u32,
        name: String,
        actor: String,
        notes: Option<String>,
    },
    StageBlocked {
        workflow_id: String,
        stage_number: u32,
        reason: String,
    },
    StageUnblocked {
        workflow_id: String,
        stage_number: u32,
    },
    WorkflowCompleted {
        workflow_id: String,
        target_date: DateTime<Utc>,
    },
    WorkflowCancelled {
        workflow_id: String,
    },
    /// Carries the full before/after due-date set for affected stages
    TimelineChanged {
        workflow_id: String,
        old_target: DateTime<Utc>,
        new_target: DateTime<Utc>,
        changes: Vec<DueDateChange>,
    },
    CheckpointRecorded {
        workflow_id: String,
        checkpoint: Checkpoint,
        location: MaterialLocation,
    },
    SessionStarted {
        workflow_id: String,
        session_ref: String,
        operator: String,
    },
    SessionCompleted {
        workflow_id: String,
        session_ref: String,
    },
    EscalationRaised {
        workflow_id: String,
        stage_number: u32,
        tier: u8,
        recipient: String,
    },
}

impl Event {
    /// Stable event name for logging and notification routing
    pub fn name(&self) -> &'static str {
        match self {
            Event::StageStarted { .. } => "stage:started",
            Event::StageCompleted { .. } => "stage:completed",
            Event::StageBlocked { .. } => "stage:blocked",
            Event::StageUnblocked { .. } => "stage:unblocked",
            Event::WorkflowCompleted { .. } => "workflow:completed",
            Event::WorkflowCancelled { .. } => "workflow:cancelled",
            Event::TimelineChanged { .. } => "workflow:timeline-changed",
            Event::CheckpointRecorded { .. } => "handoff:checkpoint",
            Event::SessionStarted { .. } => "support:started",
            Event::SessionCompleted { .. } => "support:completed",
            Event::EscalationRaised { .. } => "escalation:raised",
        }
    }
}
