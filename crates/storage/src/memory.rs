// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store for tests

use sl_core::{StoreError, WorkflowId, WorkflowInstance, WorkflowStore};
use std::collections::HashMap;
use std::sync::Mutex;

/// HashMap-backed store with the same CAS semantics as [`crate::JsonStore`]
#[derive(Default)]
pub struct MemoryStore {
    instances: Mutex<HashMap<WorkflowId, WorkflowInstance>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkflowStore for MemoryStore {
    fn load(&self, id: &WorkflowId) -> Result<WorkflowInstance, StoreError> {
        let instances = self.instances.lock().unwrap_or_else(|e| e.into_inner());
        instances
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    fn save(
        &self,
        instance: &WorkflowInstance,
        expected_version: u64,
    ) -> Result<WorkflowInstance, StoreError> {
        let mut instances = self.instances.lock().unwrap_or_else(|e| e.into_inner());
        let stored = instances.get(&instance.id).map(|i| i.version).unwrap_or(0);
        if stored != expected_version {
            return Err(StoreError::VersionConflict {
                id: instance.id.to_string(),
                expected: expected_version,
                stored,
            });
        }
        let mut saved = instance.clone();
        saved.version = expected_version + 1;
        instances.insert(saved.id.clone(), saved.clone());
        Ok(saved)
    }

    fn list(&self) -> Result<Vec<WorkflowId>, StoreError> {
        let instances = self.instances.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<WorkflowId> = instances.keys().cloned().collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(ids)
    }

    fn exists(&self, id: &WorkflowId) -> bool {
        let instances = self.instances.lock().unwrap_or_else(|e| e.into_inner());
        instances.contains_key(id)
    }
}
