// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadline derivation at initialization

use crate::prelude::*;
use sl_core::{EngineError, StageStatus};

#[tokio::test]
async fn due_dates_derive_from_the_target_date() {
    let h = harness();
    let instance = h.launch("store-042").await;

    let due: Vec<_> = instance.stages.iter().map(|s| s.due_at).collect();
    assert_eq!(
        due,
        vec![
            day(3, 26),
            day(3, 28),
            day(3, 31),
            day(4, 3),
            day(4, 14),
            day(4, 15),
            day(4, 15),
        ]
    );
}

#[tokio::test]
async fn only_the_first_stage_starts_active() {
    let h = harness();
    let instance = h.launch("store-042").await;

    assert_eq!(instance.stages[0].status, StageStatus::Active);
    assert!(instance.stages[0].started_at.is_some());
    assert!(instance.stages[1..]
        .iter()
        .all(|s| s.status == StageStatus::Pending));
}

#[tokio::test]
async fn advancing_the_first_stage_keeps_deadlines() {
    let h = harness();
    let instance = h.launch("store-042").await;

    // One day after stage 1 was due to start mattering: 19 days before D
    h.clock.set(day(3, 27));
    let updated = h
        .engine
        .advance_stage(&instance.id, 1, "maria", None)
        .await
        .unwrap();

    assert_eq!(updated.stages[0].status, StageStatus::Completed);
    assert_eq!(updated.stages[0].completed_at, Some(day(3, 27)));
    assert_eq!(updated.stages[1].status, StageStatus::Active);
    // Completing a stage never touches due dates
    let due: Vec<_> = updated.stages.iter().map(|s| s.due_at).collect();
    let original: Vec<_> = instance.stages.iter().map(|s| s.due_at).collect();
    assert_eq!(due, original);
}

#[tokio::test]
async fn same_id_cannot_be_initialized_twice() {
    let h = harness();
    h.launch("store-042").await;

    let err = h
        .engine
        .initialize(
            sl_core::WorkflowId::from("store-042"),
            "Riverside again",
            target(),
            roster(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyInitialized(_)));
}
