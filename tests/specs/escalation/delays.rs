// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delay detection and tiered escalation

use crate::prelude::*;
use chrono::Duration;
use sl_core::{Channel, DeliveryStatus, EngineError};

/// Stage 3 (due 03-31) active and four days overdue.
async fn overdue_stage_three(h: &Harness) -> sl_core::WorkflowId {
    let instance = h.launch("store-042").await;
    h.complete_stages(&instance.id, 2).await;
    h.engine
        .assign_stage(&instance.id, 3, maria())
        .await
        .unwrap();
    h.clock.set(day(4, 4));
    instance.id
}

#[tokio::test]
async fn four_days_late_raises_one_tier_one_record() {
    let h = harness();
    let id = overdue_stage_three(&h).await;

    let delayed = h.engine.detect_delays(&id).unwrap();
    // Stage 3 is four days late; pending stage 4 slipped past its own
    // deadline one day ago
    assert_eq!(
        delayed.iter().map(|s| s.stage_number).collect::<Vec<_>>(),
        vec![3, 4]
    );

    let record = h.engine.escalate(&id, 3).await.unwrap().unwrap();
    assert_eq!(record.tier, 1);
    assert_eq!(record.channel, Channel::Chat);
    assert_eq!(record.recipient, "Maria");
    assert!(matches!(record.delivery_status, DeliveryStatus::Delivered { .. }));

    // One hour later the same tier is still inside the 24h cooldown
    h.clock.advance(Duration::hours(1));
    assert!(h.engine.escalate(&id, 3).await.unwrap().is_none());
    assert_eq!(h.engine.get_instance(&id).unwrap().escalations().len(), 1);
}

#[tokio::test]
async fn one_day_late_is_below_every_threshold() {
    let h = harness();
    let id = overdue_stage_three(&h).await;

    // Stage 4 is one day overdue: delayed, but tier 0
    assert!(h.engine.escalate(&id, 4).await.unwrap().is_none());
    assert!(h.engine.get_instance(&id).unwrap().escalations().is_empty());
}

#[tokio::test]
async fn a_week_late_escalates_to_the_manager_by_voice() {
    let h = harness();
    let id = overdue_stage_three(&h).await;

    // Six days late: still tier 1
    h.clock.set(day(4, 6) + Duration::hours(12));
    let first = h.engine.escalate(&id, 3).await.unwrap().unwrap();
    assert_eq!(first.tier, 1);

    // Twelve hours later the stage crosses seven days; the higher tier
    // passes even though the tier 1 record is still inside the cooldown
    h.clock.set(day(4, 7));
    let record = h.engine.escalate(&id, 3).await.unwrap().unwrap();
    assert_eq!(record.tier, 2);
    assert_eq!(record.channel, Channel::Voice);
    assert_eq!(record.recipient, "Jonas");
    assert!(record.message.contains("CRITICAL"));
}

#[tokio::test]
async fn failed_dispatch_is_data_on_the_record() {
    let h = harness();
    let id = overdue_stage_three(&h).await;

    h.notifier.fail_with("voice provider unreachable");
    let record = h.engine.escalate(&id, 3).await.unwrap().unwrap();
    assert!(matches!(record.delivery_status, DeliveryStatus::Failed { .. }));

    // The record persisted; the command did not error
    let stored = h.engine.get_instance(&id).unwrap();
    assert_eq!(stored.escalations().len(), 1);
    assert!(matches!(
        stored.escalations()[0].delivery_status,
        DeliveryStatus::Failed { .. }
    ));
}

#[tokio::test]
async fn unassigned_stage_with_no_manager_cannot_route() {
    let h = harness();
    let bare = sl_core::Roster::new(vec![maria()]);
    let instance = h
        .engine
        .initialize(sl_core::WorkflowId::from("store-043"), "Harbor", target(), bare)
        .await
        .unwrap();

    h.clock.set(day(4, 4));
    // Stage 1 is nine days overdue: tier 2 wants the manager
    let err = h.engine.escalate(&instance.id, 1).await.unwrap_err();
    assert!(matches!(err, EngineError::NoRecipient { .. }));
}

#[tokio::test]
async fn acknowledgement_is_stamped_once() {
    let h = harness();
    let id = overdue_stage_three(&h).await;
    let record = h.engine.escalate(&id, 3).await.unwrap().unwrap();

    let updated = h
        .engine
        .acknowledge_escalation(&id, &record.id)
        .await
        .unwrap();
    assert_eq!(
        updated.escalations()[0].acknowledged_at,
        Some(day(4, 4))
    );

    let err = h
        .engine
        .acknowledge_escalation(&id, &record.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
}
