// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{TimeZone, Utc};
use sl_core::{Roster, StageTemplateTable};

fn sample(id: &str) -> WorkflowInstance {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    let target = Utc.with_ymd_and_hms(2026, 4, 15, 0, 0, 0).unwrap();
    let (instance, _) = WorkflowInstance::initialize(
        WorkflowId::from(id),
        "Riverside launch",
        target,
        Roster::default(),
        &StageTemplateTable::reference(),
        now,
    );
    instance
}

#[test]
fn save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    let instance = sample("wf-1");
    let saved = store.save(&instance, 0).unwrap();
    assert_eq!(saved.version, 1);

    let loaded = store.load(&saved.id).unwrap();
    assert_eq!(loaded, saved);
}

#[test]
fn load_missing_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    let err = store.load(&WorkflowId::from("ghost")).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[test]
fn create_requires_version_zero() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    let instance = sample("wf-1");
    let err = store.save(&instance, 3).unwrap_err();
    assert!(matches!(
        err,
        StoreError::VersionConflict {
            expected: 3,
            stored: 0,
            ..
        }
    ));
}

#[test]
fn stale_save_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    let instance = sample("wf-1");
    let saved = store.save(&instance, 0).unwrap();
    store.save(&saved, saved.version).unwrap();

    // A writer still holding version 1 loses the race
    let err = store.save(&saved, saved.version).unwrap_err();
    assert!(matches!(
        err,
        StoreError::VersionConflict {
            expected: 1,
            stored: 2,
            ..
        }
    ));
}

#[test]
fn duplicate_create_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    let instance = sample("wf-1");
    store.save(&instance, 0).unwrap();
    let err = store.save(&instance, 0).unwrap_err();
    assert!(matches!(err, StoreError::VersionConflict { .. }));
}

#[test]
fn list_returns_sorted_ids() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    store.save(&sample("wf-b"), 0).unwrap();
    store.save(&sample("wf-a"), 0).unwrap();

    let ids = store.list().unwrap();
    assert_eq!(ids, vec![WorkflowId::from("wf-a"), WorkflowId::from("wf-b")]);
}

#[test]
fn exists_tracks_saves() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    let id = WorkflowId::from("wf-1");
    assert!(!store.exists(&id));
    store.save(&sample("wf-1"), 0).unwrap();
    assert!(store.exists(&id));
}

#[test]
fn survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let saved = {
        let store = JsonStore::open(dir.path()).unwrap();
        store.save(&sample("wf-1"), 0).unwrap()
    };

    let store = JsonStore::open(dir.path()).unwrap();
    let loaded = store.load(&saved.id).unwrap();
    assert_eq!(loaded.version, 1);
    assert_eq!(loaded, saved);
}
