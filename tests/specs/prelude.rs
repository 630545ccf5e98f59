// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for engine scenario tests

use chrono::{DateTime, TimeZone, Utc};
use sl_adapters::FakeNotifier;
use sl_core::{
    Contact, DefaultComposer, FakeClock, Role, Roster, SequentialIdGen, WorkflowId,
    WorkflowInstance,
};
use sl_engine::{EngineDeps, LaunchRules, WorkflowEngine};
use sl_storage::MemoryStore;

pub type TestEngine =
    WorkflowEngine<MemoryStore, FakeNotifier, DefaultComposer, FakeClock, SequentialIdGen>;

/// Launch target used throughout: D = 2026-04-15. With the reference lead
/// times the stage deadlines are 03-26, 03-28, 03-31, 04-03, 04-14,
/// 04-15, 04-15.
pub fn target() -> DateTime<Utc> {
    day(4, 15)
}

pub fn day(month: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, month, d, 0, 0, 0).unwrap()
}

pub fn roster() -> Roster {
    Roster::new(vec![
        Contact::new("Maria", Role::Technician)
            .with_chat_handle("@maria")
            .with_phone("+491700000001"),
        Contact::new("Jonas", Role::Manager)
            .with_phone("+491700000002")
            .with_email("jonas@example.com"),
    ])
}

pub fn maria() -> Contact {
    Contact::new("Maria", Role::Technician).with_chat_handle("@maria")
}

pub struct Harness {
    pub engine: TestEngine,
    pub clock: FakeClock,
    pub notifier: FakeNotifier,
}

impl Harness {
    pub async fn launch(&self, id: &str) -> WorkflowInstance {
        self.engine
            .initialize(WorkflowId::from(id), "Riverside", target(), roster())
            .await
            .unwrap()
    }

    /// Advance stages 1..n so stage `n + 1` is active
    pub async fn complete_stages(&self, id: &WorkflowId, n: u32) {
        for stage_number in 1..=n {
            self.engine
                .advance_stage(id, stage_number, "maria", None)
                .await
                .unwrap();
        }
    }
}

pub fn harness() -> Harness {
    let clock = FakeClock::at(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
    let notifier = FakeNotifier::new();
    let engine = WorkflowEngine::new(
        EngineDeps {
            store: MemoryStore::new(),
            notifier: notifier.clone(),
            composer: DefaultComposer,
        },
        LaunchRules::reference(),
        clock.clone(),
        SequentialIdGen::default(),
    );
    Harness {
        engine,
        clock,
        notifier,
    }
}
