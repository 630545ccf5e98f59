// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for engine commands
//!
//! Every command returns a typed error to the caller; nothing is silently
//! absorbed. Delivery failure is deliberately absent here: it is recorded as
//! `DeliveryStatus::Failed` on the escalation record, not raised.

use crate::store::StoreError;
use crate::workflow::WorkflowId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad input shape, e.g. an unknown stage number
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {kind}/{id}")]
    NotFound { kind: String, id: String },
    #[error("workflow already initialized: {0}")]
    AlreadyInitialized(WorkflowId),
    /// Requested transition does not apply to the current state
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error("workflow cancelled: {0}")]
    WorkflowCancelled(WorkflowId),
    #[error("invalid checkpoint order: {0}")]
    InvalidCheckpointOrder(String),
    /// Escalation policy could not resolve a recipient
    #[error("no recipient for tier {tier} escalation on stage {stage}")]
    NoRecipient { tier: u8, stage: u32 },
    /// Lost a concurrent read-modify-write on the same instance
    #[error("concurrent update lost for workflow {0}")]
    ConcurrencyConflict(WorkflowId),
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => EngineError::NotFound {
                kind: "workflow".to_string(),
                id,
            },
            StoreError::VersionConflict { id, .. } => {
                EngineError::ConcurrencyConflict(WorkflowId(id))
            }
            other => EngineError::Store(other),
        }
    }
}
