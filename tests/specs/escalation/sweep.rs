// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sweeper-driven escalation across the whole store

use crate::prelude::*;
use chrono::Duration;
use sl_adapters::FakeNotifier;
use sl_core::{
    DefaultComposer, FakeClock, OverdueRiskScorer, SequentialIdGen, SweepConfig, WorkflowId,
};
use sl_engine::{EngineDeps, LaunchRules, Sweeper, WorkflowEngine};
use sl_storage::MemoryStore;
use std::sync::Arc;

type TestSweeper = Sweeper<
    MemoryStore,
    FakeNotifier,
    DefaultComposer,
    FakeClock,
    SequentialIdGen,
    OverdueRiskScorer,
>;

/// Sweeper tests share the engine through an Arc, the way the daemon does.
fn sweeper_harness() -> (Arc<TestEngine>, TestSweeper, FakeClock, FakeNotifier) {
    let clock = FakeClock::at(day(3, 1));
    let notifier = FakeNotifier::new();
    let engine = Arc::new(WorkflowEngine::new(
        EngineDeps {
            store: MemoryStore::new(),
            notifier: notifier.clone(),
            composer: DefaultComposer,
        },
        LaunchRules::reference(),
        clock.clone(),
        SequentialIdGen::default(),
    ));
    let sweeper = Sweeper::new(Arc::clone(&engine), OverdueRiskScorer, SweepConfig::default());
    (engine, sweeper, clock, notifier)
}

#[tokio::test]
async fn sweep_escalates_across_workflows() {
    let (engine, sweeper, clock, _) = sweeper_harness();

    for id in ["store-041", "store-042"] {
        let instance = engine
            .initialize(WorkflowId::from(id), "Riverside", target(), roster())
            .await
            .unwrap();
        engine.assign_stage(&instance.id, 1, maria()).await.unwrap();
    }

    // Stage 1 of both workflows is four days overdue
    clock.set(day(3, 30));
    let report = sweeper.tick().await;
    assert_eq!(report.workflows_scanned, 2);
    assert_eq!(report.escalations_sent, 2);

    // The next tick inside the cooldown sends nothing new
    clock.advance(Duration::hours(6));
    assert_eq!(sweeper.tick().await.escalations_sent, 0);
}

#[tokio::test]
async fn sweep_leaves_completed_workflows_alone() {
    let (engine, sweeper, clock, _) = sweeper_harness();
    let instance = engine
        .initialize(WorkflowId::from("store-042"), "Riverside", target(), roster())
        .await
        .unwrap();
    for stage in 1..=7 {
        engine
            .advance_stage(&instance.id, stage, "maria", None)
            .await
            .unwrap();
    }

    clock.set(day(4, 20));
    let report = sweeper.tick().await;
    assert_eq!(report.workflows_scanned, 0);
    assert_eq!(report.escalations_sent, 0);
}

#[tokio::test]
async fn reminders_precede_deadlines() {
    let (engine, sweeper, clock, notifier) = sweeper_harness();
    let instance = engine
        .initialize(WorkflowId::from("store-042"), "Riverside", target(), roster())
        .await
        .unwrap();
    engine.assign_stage(&instance.id, 1, maria()).await.unwrap();

    // Sixteen hours before stage 1 is due
    clock.set(day(3, 25) + Duration::hours(8));
    let before = notifier.calls().len();
    let sent = sweeper.remind().await;
    assert_eq!(sent, 1);
    let calls = notifier.calls();
    assert_eq!(calls.len(), before + 1);
    assert!(calls.last().unwrap().message.starts_with("Reminder: stage 1"));
    // A reminder is informational: nothing is recorded on the instance
    assert!(engine.get_instance(&instance.id).unwrap().escalations().is_empty());
}
