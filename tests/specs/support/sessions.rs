// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote support session lifecycle

use crate::prelude::*;
use sl_core::EngineError;

#[tokio::test]
async fn one_session_per_workflow() {
    let h = harness();
    let instance = h.launch("store-042").await;

    h.clock.set(day(4, 14));
    let updated = h
        .engine
        .start_session(&instance.id, "tv-815", "remote-ops")
        .await
        .unwrap();
    let session = updated.support.as_ref().unwrap();
    assert_eq!(session.session_ref, "tv-815");
    assert_eq!(session.started_at, day(4, 14));
    assert!(!session.is_completed());

    let err = h
        .engine
        .start_session(&instance.id, "tv-816", "remote-ops")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
}

#[tokio::test]
async fn completion_is_terminal() {
    let h = harness();
    let instance = h.launch("store-042").await;

    h.engine
        .start_session(&instance.id, "tv-815", "remote-ops")
        .await
        .unwrap();
    h.clock.set(day(4, 14));
    let updated = h
        .engine
        .complete_session(&instance.id, "tv-815")
        .await
        .unwrap();
    assert_eq!(
        updated.support.as_ref().unwrap().completed_at,
        Some(day(4, 14))
    );

    let err = h
        .engine
        .complete_session(&instance.id, "tv-815")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
}

#[tokio::test]
async fn unknown_session_ref_is_not_found() {
    let h = harness();
    let instance = h.launch("store-042").await;

    let err = h
        .engine
        .complete_session(&instance.id, "tv-999")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));

    h.engine
        .start_session(&instance.id, "tv-815", "remote-ops")
        .await
        .unwrap();
    let err = h
        .engine
        .complete_session(&instance.id, "tv-999")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}
