// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow instance state machine
//!
//! A workflow instance is the per-project state: one stage record per
//! template, the materials handoff chain, the support session, escalation
//! history, and the roster. Transitions are pure: they take the current
//! instance and return a new instance plus the events the change produced,
//! or a typed error. All I/O lives in the engine.

use crate::error::EngineError;
use crate::escalation::EscalationRecord;
use crate::event::{DueDateChange, Event};
use crate::handoff::{Checkpoint, HandoffRecord};
use crate::roster::{Contact, Roster};
use crate::stage::{StageRecord, StageStatus};
use crate::support::SupportSession;
use crate::template::StageTemplateTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a workflow instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowId(pub String);

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WorkflowId {
    fn from(s: String) -> Self {
        WorkflowId(s)
    }
}

impl From<&str> for WorkflowId {
    fn from(s: &str) -> Self {
        WorkflowId(s.to_string())
    }
}

/// Lifecycle status of a workflow instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    NotStarted,
    Active,
    Completed,
    Cancelled,
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStatus::NotStarted => write!(f, "not_started"),
            WorkflowStatus::Active => write!(f, "active"),
            WorkflowStatus::Completed => write!(f, "completed"),
            WorkflowStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Per-project launch state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowInstance {
    pub id: WorkflowId,
    /// Human label for the launch, used in messages
    pub name: String,
    /// The single date every stage deadline derives from
    pub target_date: DateTime<Utc>,
    pub status: WorkflowStatus,
    /// Optimistic-concurrency version, maintained by the store
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    /// One record per stage template, index-addressed by stage number
    pub stages: Vec<StageRecord>,
    #[serde(default)]
    pub handoff: HandoffRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support: Option<SupportSession>,
    #[serde(default)]
    pub escalations: Vec<EscalationRecord>,
    #[serde(default)]
    pub roster: Roster,
}

impl WorkflowInstance {
    /// Create an initialized instance: one stage record per template with
    /// `due_at = target_date - lead_time_days`, stage 1 active, the rest
    /// pending.
    pub fn initialize(
        id: WorkflowId,
        name: impl Into<String>,
        target_date: DateTime<Utc>,
        roster: Roster,
        templates: &StageTemplateTable,
        now: DateTime<Utc>,
    ) -> (Self, Vec<Event>) {
        let mut stages: Vec<StageRecord> = templates
            .iter()
            .map(|t| StageRecord::new(id.clone(), t.stage_number, t.name.clone(), t.due_at(target_date)))
            .collect();

        let mut events = Vec::new();
        if let Some(first) = stages.first_mut() {
            first.status = StageStatus::Active;
            first.started_at = Some(now);
            events.push(Event::StageStarted {
                workflow_id: id.0.clone(),
                stage_number: first.stage_number,
                name: first.name.clone(),
                due_at: first.due_at,
            });
        }

        let instance = Self {
            id,
            name: name.into(),
            target_date,
            status: WorkflowStatus::Active,
            version: 0,
            created_at: now,
            stages,
            handoff: HandoffRecord::default(),
            support: None,
            escalations: Vec::new(),
            roster,
        };
        (instance, events)
    }

    /// Reject mutations on a cancelled instance so callers can tell
    /// "cancelled" apart from "already done"
    fn guard_open(&self) -> Result<(), EngineError> {
        if self.status == WorkflowStatus::Cancelled {
            return Err(EngineError::WorkflowCancelled(self.id.clone()));
        }
        Ok(())
    }

    pub fn stage(&self, stage_number: u32) -> Result<&StageRecord, EngineError> {
        stage_number
            .checked_sub(1)
            .and_then(|i| self.stages.get(i as usize))
            .ok_or_else(|| {
                EngineError::Validation(format!("unknown stage number: {stage_number}"))
            })
    }

    fn stage_index(&self, stage_number: u32) -> Result<usize, EngineError> {
        self.stage(stage_number)?;
        Ok(stage_number as usize - 1)
    }

    /// The single active stage, if any
    pub fn active_stage(&self) -> Option<&StageRecord> {
        self.stages.iter().find(|s| s.is_active())
    }

    pub fn escalations(&self) -> &[EscalationRecord] {
        &self.escalations
    }

    /// Complete the active stage and activate its successor. Only the
    /// currently active stage may be advanced; anything else (already
    /// completed, out of order, blocked) is `InvalidTransition`.
    pub fn advance_stage(
        &self,
        stage_number: u32,
        actor: &str,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(Self, Vec<Event>), EngineError> {
        self.guard_open()?;
        let idx = self.stage_index(stage_number)?;
        if self.stages[idx].status != StageStatus::Active {
            return Err(EngineError::InvalidTransition(format!(
                "stage {stage_number} is {}, not active",
                self.stages[idx].status
            )));
        }

        let mut next = self.clone();
        let mut events = Vec::new();

        {
            let stage = &mut next.stages[idx];
            stage.status = StageStatus::Completed;
            stage.completed_at = Some(now);
            if notes.is_some() {
                stage.notes = notes.clone();
            }
            events.push(Event::StageCompleted {
                workflow_id: next.id.0.clone(),
                stage_number,
                name: stage.name.clone(),
                actor: actor.to_string(),
                notes,
            });
        }

        match next.stages.get_mut(idx + 1) {
            Some(successor) => {
                successor.status = StageStatus::Active;
                successor.started_at = Some(now);
                events.push(Event::StageStarted {
                    workflow_id: next.id.0.clone(),
                    stage_number: successor.stage_number,
                    name: successor.name.clone(),
                    due_at: successor.due_at,
                });
            }
            None => {
                next.status = WorkflowStatus::Completed;
                events.push(Event::WorkflowCompleted {
                    workflow_id: next.id.0.clone(),
                    target_date: next.target_date,
                });
            }
        }

        Ok((next, events))
    }

    /// Move the target date and recompute every open stage's due date from
    /// the template table. Completed records keep their historical due
    /// dates. Applying reschedules in sequence leaves the same due dates as
    /// applying the final target directly: each recomputation starts from
    /// the template, so no drift accumulates.
    pub fn reschedule_target(
        &self,
        new_target: DateTime<Utc>,
        templates: &StageTemplateTable,
    ) -> Result<(Self, Vec<Event>), EngineError> {
        self.guard_open()?;

        let mut next = self.clone();
        let old_target = next.target_date;
        next.target_date = new_target;

        let mut changes = Vec::new();
        for stage in next.stages.iter_mut().filter(|s| s.is_open()) {
            let template = templates.get(stage.stage_number).ok_or_else(|| {
                EngineError::Validation(format!(
                    "no template for stage {}",
                    stage.stage_number
                ))
            })?;
            let new_due = template.due_at(new_target);
            changes.push(DueDateChange {
                stage_number: stage.stage_number,
                old_due_at: stage.due_at,
                new_due_at: new_due,
            });
            stage.due_at = new_due;
        }

        let events = vec![Event::TimelineChanged {
            workflow_id: next.id.0.clone(),
            old_target,
            new_target,
            changes,
        }];
        Ok((next, events))
    }

    /// Terminal override: freezes all stage records and pending
    /// escalations. Allowed from any non-terminal status.
    pub fn cancel(&self) -> Result<(Self, Vec<Event>), EngineError> {
        match self.status {
            WorkflowStatus::Cancelled => Err(EngineError::WorkflowCancelled(self.id.clone())),
            WorkflowStatus::Completed => Err(EngineError::InvalidTransition(
                "workflow already completed".to_string(),
            )),
            WorkflowStatus::NotStarted | WorkflowStatus::Active => {
                let mut next = self.clone();
                next.status = WorkflowStatus::Cancelled;
                let events = vec![Event::WorkflowCancelled {
                    workflow_id: next.id.0.clone(),
                }];
                Ok((next, events))
            }
        }
    }

    /// Manual block of the active stage. Delay alone never blocks a stage;
    /// it only drives escalation.
    pub fn block_stage(
        &self,
        stage_number: u32,
        reason: &str,
    ) -> Result<(Self, Vec<Event>), EngineError> {
        self.guard_open()?;
        let idx = self.stage_index(stage_number)?;
        if self.stages[idx].status != StageStatus::Active {
            return Err(EngineError::InvalidTransition(format!(
                "stage {stage_number} is {}, only the active stage can be blocked",
                self.stages[idx].status
            )));
        }
        let mut next = self.clone();
        next.stages[idx].status = StageStatus::Blocked;
        let events = vec![Event::StageBlocked {
            workflow_id: next.id.0.clone(),
            stage_number,
            reason: reason.to_string(),
        }];
        Ok((next, events))
    }

    pub fn unblock_stage(&self, stage_number: u32) -> Result<(Self, Vec<Event>), EngineError> {
        self.guard_open()?;
        let idx = self.stage_index(stage_number)?;
        if self.stages[idx].status != StageStatus::Blocked {
            return Err(EngineError::InvalidTransition(format!(
                "stage {stage_number} is {}, not blocked",
                self.stages[idx].status
            )));
        }
        let mut next = self.clone();
        next.stages[idx].status = StageStatus::Active;
        let events = vec![Event::StageUnblocked {
            workflow_id: next.id.0.clone(),
            stage_number,
        }];
        Ok((next, events))
    }

    /// Assign a contact to a stage (escalation tier 1 routes to the
    /// assignee)
    pub fn assign_stage(
        &self,
        stage_number: u32,
        assignee: Contact,
    ) -> Result<Self, EngineError> {
        self.guard_open()?;
        let idx = self.stage_index(stage_number)?;
        if self.stages[idx].is_completed() {
            return Err(EngineError::InvalidTransition(format!(
                "stage {stage_number} already completed"
            )));
        }
        let mut next = self.clone();
        next.stages[idx].assignee = Some(assignee);
        Ok(next)
    }

    /// Pure query: open stages past their deadline at `now`. Blocked stages
    /// are excluded; blocking is a deliberate operator hold.
    pub fn detect_delays(&self, now: DateTime<Utc>) -> Vec<&StageRecord> {
        self.stages
            .iter()
            .filter(|s| {
                matches!(s.status, StageStatus::Pending | StageStatus::Active) && s.due_at < now
            })
            .collect()
    }

    pub fn record_checkpoint(
        &self,
        checkpoint: Checkpoint,
        now: DateTime<Utc>,
    ) -> Result<(Self, Vec<Event>), EngineError> {
        self.guard_open()?;
        let mut next = self.clone();
        next.handoff = self.handoff.record(checkpoint, now)?;
        let events = vec![Event::CheckpointRecorded {
            workflow_id: next.id.0.clone(),
            checkpoint,
            location: next.handoff.current_location(),
        }];
        Ok((next, events))
    }

    pub fn start_session(
        &self,
        session_ref: &str,
        operator: &str,
        now: DateTime<Utc>,
    ) -> Result<(Self, Vec<Event>), EngineError> {
        self.guard_open()?;
        if let Some(existing) = &self.support {
            return Err(EngineError::InvalidTransition(format!(
                "support session {} already started",
                existing.session_ref
            )));
        }
        let mut next = self.clone();
        next.support = Some(SupportSession::start(session_ref, operator, now));
        let events = vec![Event::SessionStarted {
            workflow_id: next.id.0.clone(),
            session_ref: session_ref.to_string(),
            operator: operator.to_string(),
        }];
        Ok((next, events))
    }

    pub fn complete_session(
        &self,
        session_ref: &str,
        now: DateTime<Utc>,
    ) -> Result<(Self, Vec<Event>), EngineError> {
        self.guard_open()?;
        let session = self.support.as_ref().ok_or_else(|| EngineError::NotFound {
            kind: "session".to_string(),
            id: session_ref.to_string(),
        })?;
        if session.session_ref != session_ref {
            return Err(EngineError::NotFound {
                kind: "session".to_string(),
                id: session_ref.to_string(),
            });
        }
        let mut next = self.clone();
        next.support = Some(session.complete(now)?);
        let events = vec![Event::SessionCompleted {
            workflow_id: next.id.0.clone(),
            session_ref: session_ref.to_string(),
        }];
        Ok((next, events))
    }

    /// Append an escalation record created by the engine
    pub fn with_escalation(&self, record: EscalationRecord) -> (Self, Vec<Event>) {
        let mut next = self.clone();
        let events = vec![Event::EscalationRaised {
            workflow_id: next.id.0.clone(),
            stage_number: record.stage_number,
            tier: record.tier,
            recipient: record.recipient.clone(),
        }];
        next.escalations.push(record);
        (next, events)
    }

    pub fn acknowledge_escalation(
        &self,
        escalation_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        self.guard_open()?;
        let mut next = self.clone();
        let record = next
            .escalations
            .iter_mut()
            .find(|r| r.id == escalation_id)
            .ok_or_else(|| EngineError::NotFound {
                kind: "escalation".to_string(),
                id: escalation_id.to_string(),
            })?;
        if record.acknowledged_at.is_some() {
            return Err(EngineError::InvalidTransition(format!(
                "escalation {escalation_id} already acknowledged"
            )));
        }
        record.acknowledged_at = Some(now);
        Ok(next)
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
