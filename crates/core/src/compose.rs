// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional capability seams: message composition and risk scoring
//!
//! Smarter collaborators (generated text, learned risk models) may be
//! plugged in here, but they only ever *suggest*; a deterministic default
//! is always available and engine correctness never depends on the
//! optional implementation.

use crate::event::Event;
use crate::stage::StageRecord;
use crate::workflow::WorkflowInstance;
use chrono::{DateTime, Utc};

/// Context handed to the composer for an escalation message
#[derive(Debug)]
pub struct EscalationContext<'a> {
    pub instance: &'a WorkflowInstance,
    pub stage: &'a StageRecord,
    pub tier: u8,
    pub days_overdue: i64,
}

/// Renders outbound message text
pub trait MessageComposer: Send + Sync {
    fn escalation(&self, ctx: &EscalationContext<'_>) -> String;

    /// Broadcast text for a workflow event; `None` means the event is not
    /// broadcast to the roster
    fn event_text(&self, instance: &WorkflowInstance, event: &Event) -> Option<String>;
}

/// Deterministic composer used when no generator is configured
#[derive(Debug, Clone, Default)]
pub struct DefaultComposer;

impl MessageComposer for DefaultComposer {
    fn escalation(&self, ctx: &EscalationContext<'_>) -> String {
        let urgency = match ctx.tier {
            1 => "URGENT",
            _ => "CRITICAL",
        };
        format!(
            "{urgency}: stage {} ({}) for {} is {} day(s) overdue. \
             Target date {}. Immediate action required.",
            ctx.stage.stage_number,
            ctx.stage.name,
            ctx.instance.name,
            ctx.days_overdue,
            ctx.instance.target_date.format("%Y-%m-%d"),
        )
    }

    fn event_text(&self, instance: &WorkflowInstance, event: &Event) -> Option<String> {
        match event {
            Event::StageCompleted {
                stage_number,
                name,
                actor,
                ..
            } => Some(format!(
                "Stage {stage_number} completed for {}: {name} (by {actor})",
                instance.name
            )),
            Event::StageStarted {
                stage_number,
                name,
                due_at,
                ..
            } => Some(format!(
                "Stage {stage_number} started for {}: {name}, due {}",
                instance.name,
                due_at.format("%Y-%m-%d")
            )),
            Event::WorkflowCompleted { target_date, .. } => Some(format!(
                "All stages complete for {}. Launched {}.",
                instance.name,
                target_date.format("%Y-%m-%d")
            )),
            Event::TimelineChanged {
                old_target,
                new_target,
                changes,
                ..
            } => {
                let mut text = format!(
                    "Target date for {} moved {} -> {}. Updated deadlines:",
                    instance.name,
                    old_target.format("%Y-%m-%d"),
                    new_target.format("%Y-%m-%d"),
                );
                for change in changes {
                    text.push_str(&format!(
                        "\n  stage {}: {}",
                        change.stage_number,
                        change.new_due_at.format("%Y-%m-%d")
                    ));
                }
                Some(text)
            }
            // Checkpoint, session, block and escalation events are targeted,
            // not broadcast
            _ => None,
        }
    }
}

/// Suggested attention level for a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Elevated,
    High,
    Critical,
}

/// Ranks stages for attention. Suggestions only; the engine never gates
/// correctness on the scorer.
pub trait RiskScorer: Send + Sync {
    fn assess(&self, stage: &StageRecord, now: DateTime<Utc>) -> RiskLevel;
}

/// Deterministic default: risk follows days overdue
#[derive(Debug, Clone, Default)]
pub struct OverdueRiskScorer;

impl RiskScorer for OverdueRiskScorer {
    fn assess(&self, stage: &StageRecord, now: DateTime<Utc>) -> RiskLevel {
        match stage.days_overdue(now) {
            0 => RiskLevel::Low,
            1..=2 => RiskLevel::Elevated,
            3..=6 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }
}
