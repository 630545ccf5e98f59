// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote-support session record
//!
//! A single start/stop record per workflow for the remote-assistance session
//! opened during installation. Terminal once completed.

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportSession {
    /// External session reference, e.g. the remote-desktop session id
    pub session_ref: String,
    pub operator: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl SupportSession {
    pub fn start(
        session_ref: impl Into<String>,
        operator: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_ref: session_ref.into(),
            operator: operator.into(),
            started_at: now,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Mark the session complete; completing twice is an invalid transition
    pub fn complete(&self, now: DateTime<Utc>) -> Result<Self, EngineError> {
        if self.is_completed() {
            return Err(EngineError::InvalidTransition(format!(
                "support session {} already completed",
                self.session_ref
            )));
        }
        Ok(Self {
            completed_at: Some(now),
            ..self.clone()
        })
    }
}
