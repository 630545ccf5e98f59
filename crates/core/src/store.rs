// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage contract for workflow instances
//!
//! The store is a generic atomic load/save surface with optimistic
//! concurrency: every save names the version it read, and a mismatch is a
//! `VersionConflict` the caller must surface rather than retry blindly.

use crate::workflow::{WorkflowId, WorkflowInstance};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("workflow not found: {id}")]
    NotFound { id: String },
    #[error("version conflict for {id}: expected {expected}, stored {stored}")]
    VersionConflict {
        id: String,
        expected: u64,
        stored: u64,
    },
    #[error("backend error: {0}")]
    Backend(String),
}

/// Durable storage for workflow instances
pub trait WorkflowStore: Send + Sync {
    /// Load an instance with its current version
    fn load(&self, id: &WorkflowId) -> Result<WorkflowInstance, StoreError>;

    /// Save an instance read at `expected_version`. A new instance is saved
    /// with `expected_version == 0`. On success the stored version becomes
    /// `expected_version + 1`; the saved copy is returned.
    fn save(
        &self,
        instance: &WorkflowInstance,
        expected_version: u64,
    ) -> Result<WorkflowInstance, StoreError>;

    /// Ids of all stored instances
    fn list(&self) -> Result<Vec<WorkflowId>, StoreError>;

    fn exists(&self, id: &WorkflowId) -> bool;
}
