// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-stage state carried by a workflow instance
//!
//! Stage records are owned by the instance as an index-addressed vector
//! keyed by stage number; each record carries the workflow id as a plain
//! value rather than a reference back to its owner.

use crate::roster::Contact;
use crate::workflow::WorkflowId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a single stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Active,
    Completed,
    Blocked,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageStatus::Pending => write!(f, "pending"),
            StageStatus::Active => write!(f, "active"),
            StageStatus::Completed => write!(f, "completed"),
            StageStatus::Blocked => write!(f, "blocked"),
        }
    }
}

/// One ordered step of the launch process with a computed deadline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub workflow_id: WorkflowId,
    pub stage_number: u32,
    pub name: String,
    pub status: StageStatus,
    /// Deadline derived from the target date; immutable once the stage
    /// completes
    pub due_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StageRecord {
    pub fn new(
        workflow_id: WorkflowId,
        stage_number: u32,
        name: impl Into<String>,
        due_at: DateTime<Utc>,
    ) -> Self {
        Self {
            workflow_id,
            stage_number,
            name: name.into(),
            status: StageStatus::Pending,
            due_at,
            started_at: None,
            completed_at: None,
            assignee: None,
            notes: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == StageStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == StageStatus::Completed
    }

    /// Open stages still track the target date: their due date moves on
    /// reschedule and they are eligible for delay detection
    pub fn is_open(&self) -> bool {
        !self.is_completed()
    }

    /// Whole days this stage is past its deadline at `now` (zero if not
    /// overdue)
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        (now - self.due_at).num_days().max(0)
    }
}
