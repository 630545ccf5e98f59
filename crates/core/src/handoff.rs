// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materials handoff checkpoint chain
//!
//! Materials move warehouse → intermediate site → destination. Each leg is a
//! timestamped checkpoint that must be recorded in declaration order; the
//! current location is derived from the last checkpoint set.

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A milestone in the handoff chain, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    WarehouseDispatched,
    IntermediateReceived,
    IntermediateDispatched,
    DestinationReceived,
}

impl Checkpoint {
    pub const ALL: [Checkpoint; 4] = [
        Checkpoint::WarehouseDispatched,
        Checkpoint::IntermediateReceived,
        Checkpoint::IntermediateDispatched,
        Checkpoint::DestinationReceived,
    ];

    fn index(self) -> usize {
        match self {
            Checkpoint::WarehouseDispatched => 0,
            Checkpoint::IntermediateReceived => 1,
            Checkpoint::IntermediateDispatched => 2,
            Checkpoint::DestinationReceived => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Checkpoint::WarehouseDispatched => "warehouse_dispatched",
            Checkpoint::IntermediateReceived => "intermediate_received",
            Checkpoint::IntermediateDispatched => "intermediate_dispatched",
            Checkpoint::DestinationReceived => "destination_received",
        }
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Checkpoint {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warehouse_dispatched" => Ok(Checkpoint::WarehouseDispatched),
            "intermediate_received" => Ok(Checkpoint::IntermediateReceived),
            "intermediate_dispatched" => Ok(Checkpoint::IntermediateDispatched),
            "destination_received" => Ok(Checkpoint::DestinationReceived),
            other => Err(EngineError::Validation(format!(
                "unknown checkpoint: {other}"
            ))),
        }
    }
}

/// Where the materials currently are, derived from the checkpoint chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialLocation {
    Warehouse,
    InTransit,
    IntermediateSite,
    Destination,
}

/// The ordered checkpoint chain for one workflow's materials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_dispatched_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_received_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_dispatched_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_received_at: Option<DateTime<Utc>>,
}

impl HandoffRecord {
    pub fn timestamp(&self, checkpoint: Checkpoint) -> Option<DateTime<Utc>> {
        match checkpoint {
            Checkpoint::WarehouseDispatched => self.warehouse_dispatched_at,
            Checkpoint::IntermediateReceived => self.intermediate_received_at,
            Checkpoint::IntermediateDispatched => self.intermediate_dispatched_at,
            Checkpoint::DestinationReceived => self.destination_received_at,
        }
    }

    /// Record a checkpoint, enforcing declaration order: checkpoint k
    /// requires k-1 already set, and no checkpoint may be recorded twice.
    pub fn record(&self, checkpoint: Checkpoint, now: DateTime<Utc>) -> Result<Self, EngineError> {
        if self.timestamp(checkpoint).is_some() {
            return Err(EngineError::InvalidCheckpointOrder(format!(
                "{checkpoint} already recorded"
            )));
        }
        let idx = checkpoint.index();
        if idx > 0 {
            let previous = Checkpoint::ALL[idx - 1];
            if self.timestamp(previous).is_none() {
                return Err(EngineError::InvalidCheckpointOrder(format!(
                    "{checkpoint} requires {previous} first"
                )));
            }
        }

        let mut next = self.clone();
        match checkpoint {
            Checkpoint::WarehouseDispatched => next.warehouse_dispatched_at = Some(now),
            Checkpoint::IntermediateReceived => next.intermediate_received_at = Some(now),
            Checkpoint::IntermediateDispatched => next.intermediate_dispatched_at = Some(now),
            Checkpoint::DestinationReceived => next.destination_received_at = Some(now),
        }
        Ok(next)
    }

    /// Location derived from the last checkpoint set
    pub fn current_location(&self) -> MaterialLocation {
        if self.destination_received_at.is_some() {
            MaterialLocation::Destination
        } else if self.intermediate_dispatched_at.is_some() {
            MaterialLocation::InTransit
        } else if self.intermediate_received_at.is_some() {
            MaterialLocation::IntermediateSite
        } else if self.warehouse_dispatched_at.is_some() {
            MaterialLocation::InTransit
        } else {
            MaterialLocation::Warehouse
        }
    }
}

#[cfg(test)]
#[path = "handoff_tests.rs"]
mod tests;
