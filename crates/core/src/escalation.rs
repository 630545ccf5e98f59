// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Escalation policy and records
//!
//! Lateness maps to a tier through a data-driven threshold table, and a
//! cooldown window prevents duplicate notifications: within the window a
//! same-or-lower tier is suppressed, while a strictly higher tier always
//! passes. Going up skips the cooldown; repeating or going down never does.

use crate::notify::Channel;
use crate::workflow::WorkflowId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Delivery outcome recorded on an escalation. Failure lives here as data;
/// it is never raised to the engine's caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Delivered {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        provider_id: Option<String>,
    },
    Failed {
        error: String,
    },
}

/// A single escalation sent (or attempted) for a late stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationRecord {
    pub id: String,
    pub workflow_id: WorkflowId,
    /// Subject stage of the escalation
    pub stage_number: u32,
    pub tier: u8,
    pub channel: Channel,
    /// Resolved recipient name
    pub recipient: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub delivery_status: DeliveryStatus,
}

/// Overdue-duration threshold that activates a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThreshold {
    pub min_days_overdue: i64,
    pub tier: u8,
}

/// Who a tier escalates to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientRole {
    /// The late stage's assignee
    Assignee,
    /// The project's manager from the roster
    Manager,
}

/// Channel and recipient resolution for a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRoute {
    pub tier: u8,
    pub channel: Channel,
    pub recipient: RecipientRole,
}

/// Pure mapping from overdue duration to escalation behaviour
#[derive(Debug, Clone)]
pub struct EscalationPolicy {
    /// Ascending by `min_days_overdue`; anything below the first threshold
    /// is tier 0 (no action)
    thresholds: Vec<TierThreshold>,
    pub cooldown: Duration,
    routes: Vec<TierRoute>,
}

impl EscalationPolicy {
    pub fn new(mut thresholds: Vec<TierThreshold>, cooldown: Duration, routes: Vec<TierRoute>) -> Self {
        thresholds.sort_by_key(|t| t.min_days_overdue);
        Self {
            thresholds,
            cooldown,
            routes,
        }
    }

    /// Reference policy: 3 days late is tier 1 (chat to the assignee),
    /// 7 days late is tier 2 (voice to the manager), 24h cooldown.
    pub fn reference() -> Self {
        Self::new(
            vec![
                TierThreshold {
                    min_days_overdue: 3,
                    tier: 1,
                },
                TierThreshold {
                    min_days_overdue: 7,
                    tier: 2,
                },
            ],
            Duration::hours(24),
            vec![
                TierRoute {
                    tier: 1,
                    channel: Channel::Chat,
                    recipient: RecipientRole::Assignee,
                },
                TierRoute {
                    tier: 2,
                    channel: Channel::Voice,
                    recipient: RecipientRole::Manager,
                },
            ],
        )
    }

    /// Deterministic step function: the highest threshold at or below
    /// `days_overdue` wins; below every threshold is tier 0.
    pub fn tier_for(&self, days_overdue: i64) -> u8 {
        self.thresholds
            .iter()
            .rev()
            .find(|t| days_overdue >= t.min_days_overdue)
            .map(|t| t.tier)
            .unwrap_or(0)
    }

    pub fn route(&self, tier: u8) -> Option<&TierRoute> {
        self.routes.iter().find(|r| r.tier == tier)
    }

    /// Whether a new escalation at `tier` for `stage_number` is suppressed
    /// by an existing record at the same or higher tier inside the cooldown
    /// window.
    pub fn suppressed(
        &self,
        existing: &[EscalationRecord],
        stage_number: u32,
        tier: u8,
        now: DateTime<Utc>,
    ) -> bool {
        existing.iter().any(|rec| {
            rec.stage_number == stage_number
                && rec.tier >= tier
                && now - rec.created_at < self.cooldown
        })
    }
}

#[cfg(test)]
#[path = "escalation_tests.rs"]
mod tests;
