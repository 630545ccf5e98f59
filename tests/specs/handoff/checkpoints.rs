// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materials handoff checkpoint chain

use crate::prelude::*;
use sl_core::{Checkpoint, EngineError, MaterialLocation};

#[tokio::test]
async fn checkpoints_advance_the_location_in_order() {
    let h = harness();
    let instance = h.launch("store-042").await;
    let id = &instance.id;

    assert_eq!(instance.handoff.current_location(), MaterialLocation::Warehouse);

    let steps = [
        (Checkpoint::WarehouseDispatched, MaterialLocation::InTransit),
        (Checkpoint::IntermediateReceived, MaterialLocation::IntermediateSite),
        (Checkpoint::IntermediateDispatched, MaterialLocation::InTransit),
        (Checkpoint::DestinationReceived, MaterialLocation::Destination),
    ];
    for (checkpoint, expected) in steps {
        let updated = h.engine.record_checkpoint(id, checkpoint).await.unwrap();
        assert_eq!(updated.handoff.current_location(), expected);
        assert!(updated.handoff.timestamp(checkpoint).is_some());
    }
}

#[tokio::test]
async fn receiving_at_destination_requires_the_full_chain() {
    let h = harness();
    let instance = h.launch("store-042").await;
    let id = &instance.id;

    h.engine
        .record_checkpoint(id, Checkpoint::WarehouseDispatched)
        .await
        .unwrap();
    h.engine
        .record_checkpoint(id, Checkpoint::IntermediateReceived)
        .await
        .unwrap();

    // Destination cannot be recorded before the intermediate dispatch
    let err = h
        .engine
        .record_checkpoint(id, Checkpoint::DestinationReceived)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCheckpointOrder(_)));

    // The failed attempt left no timestamp behind
    let stored = h.engine.get_instance(id).unwrap();
    assert!(stored.handoff.timestamp(Checkpoint::DestinationReceived).is_none());
}

#[tokio::test]
async fn checkpoints_cannot_repeat() {
    let h = harness();
    let instance = h.launch("store-042").await;

    h.engine
        .record_checkpoint(&instance.id, Checkpoint::WarehouseDispatched)
        .await
        .unwrap();
    let err = h
        .engine
        .record_checkpoint(&instance.id, Checkpoint::WarehouseDispatched)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCheckpointOrder(_)));
}
