// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic timeline reschedule

use crate::prelude::*;
use chrono::Duration;

#[tokio::test]
async fn reschedule_shifts_every_open_deadline() {
    let h = harness();
    let instance = h.launch("store-042").await;
    h.complete_stages(&instance.id, 1).await;

    let updated = h
        .engine
        .reschedule_target(&instance.id, target() + Duration::days(10))
        .await
        .unwrap();

    // Completed stage 1 keeps its recorded deadline
    assert_eq!(updated.stages[0].due_at, day(3, 26));
    // Stages 2..7 move by exactly +10 days
    for (before, after) in instance.stages[1..].iter().zip(&updated.stages[1..]) {
        assert_eq!(after.due_at, before.due_at + Duration::days(10));
    }
    assert_eq!(updated.target_date, target() + Duration::days(10));
}

#[tokio::test]
async fn sequential_reschedules_do_not_drift() {
    let h = harness();
    let instance = h.launch("store-042").await;

    for offset in [3, 7, 10] {
        h.engine
            .reschedule_target(&instance.id, target() + Duration::days(offset))
            .await
            .unwrap();
    }
    let stepped = h.engine.get_instance(&instance.id).unwrap();

    let h2 = harness();
    let other = h2.launch("store-042").await;
    let direct = h2
        .engine
        .reschedule_target(&other.id, target() + Duration::days(10))
        .await
        .unwrap();

    let stepped_due: Vec<_> = stepped.stages.iter().map(|s| s.due_at).collect();
    let direct_due: Vec<_> = direct.stages.iter().map(|s| s.due_at).collect();
    similar_asserts::assert_eq!(stepped_due, direct_due);
}

#[tokio::test]
async fn broadcast_announces_the_new_timeline() {
    let h = harness();
    let instance = h.launch("store-042").await;

    h.engine
        .reschedule_target(&instance.id, target() + Duration::days(10))
        .await
        .unwrap();

    let calls = h.notifier.calls();
    let timeline: Vec<_> = calls
        .iter()
        .filter(|c| c.message.contains("Target date"))
        .collect();
    // One message per roster member
    assert_eq!(timeline.len(), 2);
    assert!(timeline[0].message.contains("2026-04-15 -> 2026-04-25"));
}
