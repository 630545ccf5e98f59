// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage ordering and workflow lifecycle rules

use crate::prelude::*;
use sl_core::{EngineError, StageStatus, WorkflowStatus};

#[tokio::test]
async fn skipping_ahead_is_rejected_and_changes_nothing() {
    let h = harness();
    let instance = h.launch("store-042").await;
    h.complete_stages(&instance.id, 1).await;
    let before = h.engine.get_instance(&instance.id).unwrap();

    // Stage 2 is active; stage 3 cannot be advanced yet
    let err = h
        .engine
        .advance_stage(&instance.id, 3, "maria", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    let after = h.engine.get_instance(&instance.id).unwrap();
    similar_asserts::assert_eq!(before, after);
}

#[tokio::test]
async fn blocked_stages_pause_without_reordering() {
    let h = harness();
    let instance = h.launch("store-042").await;

    h.engine
        .block_stage(&instance.id, 1, "permit pending")
        .await
        .unwrap();
    let blocked = h.engine.get_instance(&instance.id).unwrap();
    assert_eq!(blocked.stages[0].status, StageStatus::Blocked);

    // A blocked stage cannot be advanced
    let err = h
        .engine
        .advance_stage(&instance.id, 1, "maria", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    h.engine.unblock_stage(&instance.id, 1).await.unwrap();
    h.engine
        .advance_stage(&instance.id, 1, "maria", None)
        .await
        .unwrap();
}

#[tokio::test]
async fn completing_the_last_stage_completes_the_workflow() {
    let h = harness();
    let instance = h.launch("store-042").await;
    h.complete_stages(&instance.id, 7).await;

    let done = h.engine.get_instance(&instance.id).unwrap();
    assert_eq!(done.status, WorkflowStatus::Completed);
    assert!(done.stages.iter().all(|s| s.completed_at.is_some()));
}

#[tokio::test]
async fn cancel_freezes_the_instance() {
    let h = harness();
    let instance = h.launch("store-042").await;
    h.engine.cancel(&instance.id).await.unwrap();

    let cancelled = h.engine.get_instance(&instance.id).unwrap();
    assert_eq!(cancelled.status, WorkflowStatus::Cancelled);

    let err = h
        .engine
        .advance_stage(&instance.id, 1, "maria", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::WorkflowCancelled(_)));
    let err = h
        .engine
        .reschedule_target(&instance.id, target())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::WorkflowCancelled(_)));

    // Escalation is rejected the same way, not silently skipped, even
    // with stage 1 days past its deadline
    h.clock.set(day(3, 30));
    let err = h.engine.escalate(&instance.id, 1).await.unwrap_err();
    assert!(matches!(err, EngineError::WorkflowCancelled(_)));
}

#[tokio::test]
async fn completed_workflow_cannot_be_cancelled() {
    let h = harness();
    let instance = h.launch("store-042").await;
    h.complete_stages(&instance.id, 7).await;

    let err = h.engine.cancel(&instance.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
}
