// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-file store: one document per workflow instance
//!
//! Each instance lives at `<root>/<id>.json`. Saves are
//! compare-and-swap: the caller names the version it loaded, and a
//! mismatch means someone else saved first. Writes go through a temp
//! file and rename so a crash never leaves a half-written document.

use sl_core::{StoreError, WorkflowId, WorkflowInstance, WorkflowStore};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File-backed workflow store
pub struct JsonStore {
    root: PathBuf,
    // Serializes the read-check-write window of a CAS save
    write_lock: Mutex<()>,
}

impl JsonStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn doc_path(&self, id: &WorkflowId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn read_doc(&self, path: &Path, id: &WorkflowId) -> Result<WorkflowInstance, StoreError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { id: id.to_string() });
            }
            Err(e) => return Err(StoreError::Backend(e.to_string())),
        };
        serde_json::from_str(&content).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn write_doc(&self, path: &Path, instance: &WorkflowInstance) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(instance)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp).map_err(|e| StoreError::Backend(e.to_string()))?;
            file.write_all(content.as_bytes())
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            file.sync_all().map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        fs::rename(&tmp, path).map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl WorkflowStore for JsonStore {
    fn load(&self, id: &WorkflowId) -> Result<WorkflowInstance, StoreError> {
        self.read_doc(&self.doc_path(id), id)
    }

    fn save(
        &self,
        instance: &WorkflowInstance,
        expected_version: u64,
    ) -> Result<WorkflowInstance, StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.doc_path(&instance.id);

        let stored = match self.read_doc(&path, &instance.id) {
            Ok(existing) => Some(existing.version),
            Err(StoreError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        match (stored, expected_version) {
            (None, 0) => {}
            (None, expected) => {
                return Err(StoreError::VersionConflict {
                    id: instance.id.to_string(),
                    expected,
                    stored: 0,
                });
            }
            (Some(stored), expected) if stored != expected => {
                return Err(StoreError::VersionConflict {
                    id: instance.id.to_string(),
                    expected,
                    stored,
                });
            }
            (Some(_), _) => {}
        }

        let mut saved = instance.clone();
        saved.version = expected_version + 1;
        self.write_doc(&path, &saved)?;
        tracing::debug!(
            workflow_id = %saved.id,
            version = saved.version,
            "workflow saved"
        );
        Ok(saved)
    }

    fn list(&self) -> Result<Vec<WorkflowId>, StoreError> {
        let mut ids = Vec::new();
        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::Backend(e.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Backend(e.to_string()))?;
            let path = entry.path();
            if path.extension().map(|e| e == "json") != Some(true) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(WorkflowId::from(stem));
            }
        }
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(ids)
    }

    fn exists(&self, id: &WorkflowId) -> bool {
        self.doc_path(id).exists()
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
