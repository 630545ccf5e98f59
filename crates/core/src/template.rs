// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage template table
//!
//! The template table is the static, ordered definition of the launch
//! process: one entry per stage with the lead time (days before the target
//! date) at which the stage is due. It is loaded once at startup, validated,
//! and immutable thereafter.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("stage template table is empty")]
    Empty,
    #[error("stage numbers must be contiguous from 1: expected {expected}, found {found}")]
    NonContiguous { expected: u32, found: u32 },
    #[error("stage {stage} has negative lead time {days}")]
    NegativeLeadTime { stage: u32, days: i64 },
}

/// Definition of a single launch stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTemplate {
    pub stage_number: u32,
    pub name: String,
    /// Days before the target date this stage is due
    pub lead_time_days: i64,
}

impl StageTemplate {
    pub fn new(stage_number: u32, name: impl Into<String>, lead_time_days: i64) -> Self {
        Self {
            stage_number,
            name: name.into(),
            lead_time_days,
        }
    }

    /// Due date for this stage given a target date
    pub fn due_at(&self, target_date: DateTime<Utc>) -> DateTime<Utc> {
        target_date - Duration::days(self.lead_time_days)
    }
}

/// Validated, ordered table of stage templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTemplateTable {
    stages: Vec<StageTemplate>,
}

impl StageTemplateTable {
    /// Build a table, enforcing contiguous 1..N numbering and non-negative
    /// lead times
    pub fn new(stages: Vec<StageTemplate>) -> Result<Self, TemplateError> {
        if stages.is_empty() {
            return Err(TemplateError::Empty);
        }
        for (i, stage) in stages.iter().enumerate() {
            let expected = i as u32 + 1;
            if stage.stage_number != expected {
                return Err(TemplateError::NonContiguous {
                    expected,
                    found: stage.stage_number,
                });
            }
            if stage.lead_time_days < 0 {
                return Err(TemplateError::NegativeLeadTime {
                    stage: stage.stage_number,
                    days: stage.lead_time_days,
                });
            }
        }
        Ok(Self { stages })
    }

    /// The reference seven-stage launch process
    pub fn reference() -> Self {
        let stages = vec![
            StageTemplate::new(1, "Confirm intermediate site details", 20),
            StageTemplate::new(2, "Complete checklist and dispatch from warehouse", 18),
            StageTemplate::new(3, "Confirm material at intermediate site", 15),
            StageTemplate::new(4, "Confirm material at destination", 12),
            StageTemplate::new(5, "Start installation and remote session", 1),
            StageTemplate::new(6, "Final checklist on launch day", 0),
            StageTemplate::new(7, "Launch complete", 0),
        ];
        // Reference table is statically valid
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Look up a template by stage number
    pub fn get(&self, stage_number: u32) -> Option<&StageTemplate> {
        self.stages.get(stage_number.checked_sub(1)? as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageTemplate> {
        self.stages.iter()
    }

    /// Number of the final stage
    pub fn last_stage_number(&self) -> u32 {
        self.stages.len() as u32
    }
}
