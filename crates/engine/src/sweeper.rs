// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic driver for delay detection and reminders
//!
//! The sweeper is the only scheduler in the system: one component with
//! two tokio tickers, started and stopped with the process. Each delay
//! tick scans open instances, detects overdue stages, and asks the
//! engine to escalate; the engine's own cooldown keeps repeated ticks
//! from spamming anyone.

use crate::engine::WorkflowEngine;
use sl_core::{
    Clock, DeliveryStatus, EngineError, IdGen, MessageComposer, Notifier, RiskScorer, StageRecord,
    SweepConfig, WorkflowStatus, WorkflowStore,
};
use std::cmp::Reverse;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

/// Counters from one delay sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Active workflows examined
    pub workflows_scanned: usize,
    /// Overdue open stages found
    pub delayed_stages: usize,
    /// Escalation records created this tick
    pub escalations_sent: usize,
    /// Created records whose dispatch failed
    pub deliveries_failed: usize,
    /// Workflows or stages skipped on error
    pub errors: usize,
}

/// Periodic sweeper over all stored workflows
pub struct Sweeper<S, N, M, C: Clock, I: IdGen, R> {
    engine: Arc<WorkflowEngine<S, N, M, C, I>>,
    scorer: R,
    config: SweepConfig,
}

impl<S, N, M, C, I, R> Sweeper<S, N, M, C, I, R>
where
    S: WorkflowStore,
    N: Notifier,
    M: MessageComposer,
    C: Clock,
    I: IdGen,
    R: RiskScorer,
{
    pub fn new(engine: Arc<WorkflowEngine<S, N, M, C, I>>, scorer: R, config: SweepConfig) -> Self {
        Self {
            engine,
            scorer,
            config,
        }
    }

    /// One delay sweep over every active workflow
    pub async fn tick(&self) -> SweepReport {
        let now = self.engine.now();
        let mut report = SweepReport::default();

        let ids = match self.engine.list() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(error = %e, "delay sweep: listing workflows failed");
                report.errors += 1;
                return report;
            }
        };

        for id in ids {
            let instance = match self.engine.get_instance(&id) {
                Ok(instance) => instance,
                Err(e) => {
                    tracing::warn!(workflow_id = %id, error = %e, "delay sweep: load failed");
                    report.errors += 1;
                    continue;
                }
            };
            if instance.status != WorkflowStatus::Active {
                continue;
            }
            report.workflows_scanned += 1;

            // Worst stages first, so the riskiest escalation goes out even
            // if a later save in the same tick conflicts
            let mut delayed: Vec<StageRecord> =
                instance.detect_delays(now).into_iter().cloned().collect();
            delayed.sort_by_key(|s| Reverse(self.scorer.assess(s, now)));
            report.delayed_stages += delayed.len();

            for stage in delayed {
                match self.engine.escalate(&id, stage.stage_number).await {
                    Ok(Some(record)) => {
                        report.escalations_sent += 1;
                        if matches!(record.delivery_status, DeliveryStatus::Failed { .. }) {
                            report.deliveries_failed += 1;
                        }
                    }
                    Ok(None) => {}
                    Err(EngineError::ConcurrencyConflict(_)) => {
                        // Someone saved under us; the next tick will retry
                        tracing::debug!(
                            workflow_id = %id,
                            stage_number = stage.stage_number,
                            "delay sweep: lost concurrent save"
                        );
                        report.errors += 1;
                    }
                    Err(e) => {
                        tracing::warn!(
                            workflow_id = %id,
                            stage_number = stage.stage_number,
                            error = %e,
                            "delay sweep: escalation failed"
                        );
                        report.errors += 1;
                    }
                }
            }
        }

        tracing::info!(
            workflows = report.workflows_scanned,
            delayed = report.delayed_stages,
            escalated = report.escalations_sent,
            failed = report.deliveries_failed,
            errors = report.errors,
            "delay sweep complete"
        );
        report
    }

    /// One reminder pass: upcoming deadlines within the configured
    /// lookahead window
    pub async fn remind(&self) -> usize {
        let lookahead = chrono::Duration::from_std(self.config.reminder_lookahead)
            .unwrap_or(chrono::Duration::MAX);
        let ids = match self.engine.list() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(error = %e, "reminder pass: listing workflows failed");
                return 0;
            }
        };

        let mut sent = 0;
        for id in ids {
            match self.engine.remind_upcoming(&id, lookahead).await {
                Ok(n) => sent += n,
                Err(e) => {
                    tracing::warn!(workflow_id = %id, error = %e, "reminder pass failed");
                }
            }
        }
        if sent > 0 {
            tracing::info!(sent, "reminders sent");
        }
        sent
    }

    /// Run both tickers until `shutdown` flips to true
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut remind_timer = tokio::time::interval(self.config.reminder_interval);
        let mut delay_timer = tokio::time::interval(self.config.delay_interval);
        remind_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        delay_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = delay_timer.tick() => {
                    self.tick().await;
                }
                _ = remind_timer.tick() => {
                    self.remind().await;
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("sweeper stopped");
    }
}

#[cfg(test)]
#[path = "sweeper_tests.rs"]
mod tests;
