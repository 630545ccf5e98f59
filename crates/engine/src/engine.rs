// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow engine: commands and queries over the store
//!
//! Every mutation is one load, one pure transition, one compare-and-swap
//! save. Losers of a concurrent save observe `ConcurrencyConflict`.
//! Notification dispatch runs after the save and only ever patches
//! delivery status back in, so a slow or dead provider can never hold a
//! workflow transaction open.

use chrono::{DateTime, Utc};
use sl_core::{
    Channel, Checkpoint, Clock, ConfigError, Contact, DeliveryStatus, EngineError,
    EscalationContext, EscalationPolicy, EscalationRecord, Event, IdGen, LaunchConfig,
    MessageComposer, Notifier, RecipientRole, Roster, StageRecord, StageStatus,
    StageTemplateTable, StoreError, WorkflowId, WorkflowInstance, WorkflowStatus, WorkflowStore,
};
use std::time::Duration;

/// Engine adapter dependencies
pub struct EngineDeps<S, N, M> {
    pub store: S,
    pub notifier: N,
    pub composer: M,
}

/// Immutable per-process rules: stage templates, escalation policy,
/// delivery timeout
pub struct LaunchRules {
    pub templates: StageTemplateTable,
    pub escalation: EscalationPolicy,
    pub notify_timeout: Duration,
}

impl LaunchRules {
    pub fn from_config(config: &LaunchConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            templates: config.template_table()?,
            escalation: config.escalation_policy()?,
            notify_timeout: config.notify_timeout,
        })
    }

    /// Reference deployment rules
    pub fn reference() -> Self {
        Self {
            templates: StageTemplateTable::reference(),
            escalation: EscalationPolicy::reference(),
            notify_timeout: Duration::from_secs(10),
        }
    }
}

/// Engine that coordinates workflow instances
pub struct WorkflowEngine<S, N, M, C: Clock, I: IdGen> {
    store: S,
    notifier: N,
    composer: M,
    clock: C,
    ids: I,
    rules: LaunchRules,
}

impl<S, N, M, C, I> WorkflowEngine<S, N, M, C, I>
where
    S: WorkflowStore,
    N: Notifier,
    M: MessageComposer,
    C: Clock,
    I: IdGen,
{
    pub fn new(deps: EngineDeps<S, N, M>, rules: LaunchRules, clock: C, ids: I) -> Self {
        Self {
            store: deps.store,
            notifier: deps.notifier,
            composer: deps.composer,
            clock,
            ids,
            rules,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Create and persist a new workflow instance: one stage record per
    /// template, stage 1 active.
    pub async fn initialize(
        &self,
        id: WorkflowId,
        name: &str,
        target_date: DateTime<Utc>,
        roster: Roster,
    ) -> Result<WorkflowInstance, EngineError> {
        if self.store.exists(&id) {
            return Err(EngineError::AlreadyInitialized(id));
        }

        let now = self.clock.now();
        let (instance, events) =
            WorkflowInstance::initialize(id, name, target_date, roster, &self.rules.templates, now);

        let saved = match self.store.save(&instance, 0) {
            Ok(saved) => saved,
            // Lost a create race: someone else initialized first
            Err(StoreError::VersionConflict { .. }) => {
                return Err(EngineError::AlreadyInitialized(instance.id));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            workflow_id = %saved.id,
            target_date = %saved.target_date.format("%Y-%m-%d"),
            stages = saved.stages.len(),
            "workflow initialized"
        );
        self.broadcast(&saved, &events).await;
        Ok(saved)
    }

    pub fn get_instance(&self, id: &WorkflowId) -> Result<WorkflowInstance, EngineError> {
        Ok(self.store.load(id)?)
    }

    pub fn list(&self) -> Result<Vec<WorkflowId>, EngineError> {
        Ok(self.store.list()?)
    }

    /// Open stages past their deadline right now
    pub fn detect_delays(&self, id: &WorkflowId) -> Result<Vec<StageRecord>, EngineError> {
        let now = self.clock.now();
        let instance = self.store.load(id)?;
        Ok(instance.detect_delays(now).into_iter().cloned().collect())
    }

    pub async fn advance_stage(
        &self,
        id: &WorkflowId,
        stage_number: u32,
        actor: &str,
        notes: Option<String>,
    ) -> Result<WorkflowInstance, EngineError> {
        self.apply(id, |instance, now| {
            instance.advance_stage(stage_number, actor, notes, now)
        })
        .await
    }

    /// Move the target date; every open stage deadline is recomputed from
    /// the templates in the same save.
    pub async fn reschedule_target(
        &self,
        id: &WorkflowId,
        new_target: DateTime<Utc>,
    ) -> Result<WorkflowInstance, EngineError> {
        self.apply(id, |instance, _| {
            instance.reschedule_target(new_target, &self.rules.templates)
        })
        .await
    }

    pub async fn cancel(&self, id: &WorkflowId) -> Result<WorkflowInstance, EngineError> {
        self.apply(id, |instance, _| instance.cancel()).await
    }

    pub async fn block_stage(
        &self,
        id: &WorkflowId,
        stage_number: u32,
        reason: &str,
    ) -> Result<WorkflowInstance, EngineError> {
        self.apply(id, |instance, _| instance.block_stage(stage_number, reason))
            .await
    }

    pub async fn unblock_stage(
        &self,
        id: &WorkflowId,
        stage_number: u32,
    ) -> Result<WorkflowInstance, EngineError> {
        self.apply(id, |instance, _| instance.unblock_stage(stage_number))
            .await
    }

    pub async fn assign_stage(
        &self,
        id: &WorkflowId,
        stage_number: u32,
        assignee: Contact,
    ) -> Result<WorkflowInstance, EngineError> {
        self.apply(id, |instance, _| {
            Ok((instance.assign_stage(stage_number, assignee)?, Vec::new()))
        })
        .await
    }

    pub async fn record_checkpoint(
        &self,
        id: &WorkflowId,
        checkpoint: Checkpoint,
    ) -> Result<WorkflowInstance, EngineError> {
        self.apply(id, |instance, now| instance.record_checkpoint(checkpoint, now))
            .await
    }

    pub async fn start_session(
        &self,
        id: &WorkflowId,
        session_ref: &str,
        operator: &str,
    ) -> Result<WorkflowInstance, EngineError> {
        self.apply(id, |instance, now| {
            instance.start_session(session_ref, operator, now)
        })
        .await
    }

    pub async fn complete_session(
        &self,
        id: &WorkflowId,
        session_ref: &str,
    ) -> Result<WorkflowInstance, EngineError> {
        self.apply(id, |instance, now| instance.complete_session(session_ref, now))
            .await
    }

    pub async fn acknowledge_escalation(
        &self,
        id: &WorkflowId,
        escalation_id: &str,
    ) -> Result<WorkflowInstance, EngineError> {
        self.apply(id, |instance, now| {
            Ok((instance.acknowledge_escalation(escalation_id, now)?, Vec::new()))
        })
        .await
    }

    /// Escalate a late stage if the policy calls for it.
    ///
    /// Returns `Ok(None)` when no escalation is due: the stage maps to
    /// tier 0, or the cooldown suppresses a same-or-lower tier. A cancelled
    /// workflow rejects with `WorkflowCancelled` like every other mutation.
    /// The record
    /// is persisted before dispatch; the delivery outcome is patched in
    /// afterwards and reported in the returned record.
    pub async fn escalate(
        &self,
        id: &WorkflowId,
        stage_number: u32,
    ) -> Result<Option<EscalationRecord>, EngineError> {
        let now = self.clock.now();
        let instance = self.store.load(id)?;
        match instance.status {
            WorkflowStatus::Active => {}
            WorkflowStatus::Cancelled => {
                return Err(EngineError::WorkflowCancelled(instance.id));
            }
            // Nothing left to escalate; not an error
            WorkflowStatus::NotStarted | WorkflowStatus::Completed => return Ok(None),
        }

        let stage = instance.stage(stage_number)?.clone();
        if !matches!(stage.status, StageStatus::Pending | StageStatus::Active) {
            return Ok(None);
        }

        let days_overdue = stage.days_overdue(now);
        let tier = self.rules.escalation.tier_for(days_overdue);
        if tier == 0 {
            return Ok(None);
        }
        if self
            .rules
            .escalation
            .suppressed(instance.escalations(), stage_number, tier, now)
        {
            tracing::debug!(
                workflow_id = %id,
                stage_number,
                tier,
                "escalation suppressed by cooldown"
            );
            return Ok(None);
        }

        let route = *self
            .rules
            .escalation
            .route(tier)
            .ok_or(EngineError::NoRecipient {
                tier,
                stage: stage_number,
            })?;
        let contact = match route.recipient {
            RecipientRole::Assignee => stage.assignee.clone(),
            RecipientRole::Manager => instance.roster.manager().cloned(),
        }
        .ok_or(EngineError::NoRecipient {
            tier,
            stage: stage_number,
        })?;

        let message = self.composer.escalation(&EscalationContext {
            instance: &instance,
            stage: &stage,
            tier,
            days_overdue,
        });

        let mut record = EscalationRecord {
            id: self.ids.next(),
            workflow_id: instance.id.clone(),
            stage_number,
            tier,
            channel: route.channel,
            recipient: contact.name.clone(),
            message: message.clone(),
            created_at: now,
            acknowledged_at: None,
            delivery_status: DeliveryStatus::Pending,
        };

        let (next, events) = instance.with_escalation(record.clone());
        let saved = self.store.save(&next, instance.version)?;
        tracing::warn!(
            workflow_id = %saved.id,
            stage_number,
            tier,
            days_overdue,
            recipient = %record.recipient,
            "escalation raised"
        );
        self.broadcast(&saved, &events).await;

        // Dispatch outside the save; the outcome is data on the record
        let delivery = self
            .notifier
            .send(route.channel, &contact, &message, self.rules.notify_timeout)
            .await;
        let status = if delivery.delivered {
            DeliveryStatus::Delivered {
                provider_id: delivery.provider_id,
            }
        } else {
            DeliveryStatus::Failed {
                error: delivery
                    .error
                    .unwrap_or_else(|| "delivery failed".to_string()),
            }
        };
        self.patch_delivery(id, &record.id, status.clone());
        record.delivery_status = status;
        Ok(Some(record))
    }

    /// Reminder pass: chat the assignee of any open stage coming due
    /// within `lookahead`. Informational only, no record is written.
    pub async fn remind_upcoming(
        &self,
        id: &WorkflowId,
        lookahead: chrono::Duration,
    ) -> Result<usize, EngineError> {
        let now = self.clock.now();
        let instance = self.store.load(id)?;
        if instance.status != WorkflowStatus::Active {
            return Ok(0);
        }

        let mut sent = 0;
        for stage in instance
            .stages
            .iter()
            .filter(|s| matches!(s.status, StageStatus::Pending | StageStatus::Active))
        {
            if stage.due_at < now || stage.due_at - now > lookahead {
                continue;
            }
            let Some(assignee) = &stage.assignee else {
                continue;
            };
            let text = format!(
                "Reminder: stage {} ({}) for {} is due {}",
                stage.stage_number,
                stage.name,
                instance.name,
                stage.due_at.format("%Y-%m-%d"),
            );
            let delivery = self
                .notifier
                .send(Channel::Chat, assignee, &text, self.rules.notify_timeout)
                .await;
            if delivery.delivered {
                sent += 1;
            } else {
                tracing::warn!(
                    workflow_id = %instance.id,
                    stage_number = stage.stage_number,
                    recipient = %assignee.name,
                    error = delivery.error.as_deref(),
                    "reminder delivery failed"
                );
            }
        }
        Ok(sent)
    }

    /// One load, one pure transition, one CAS save, then best-effort
    /// broadcast of the produced events.
    async fn apply<F>(&self, id: &WorkflowId, transition: F) -> Result<WorkflowInstance, EngineError>
    where
        F: FnOnce(
            &WorkflowInstance,
            DateTime<Utc>,
        ) -> Result<(WorkflowInstance, Vec<Event>), EngineError>,
    {
        let now = self.clock.now();
        let current = self.store.load(id)?;
        let (next, events) = transition(&current, now)?;
        let saved = self.store.save(&next, current.version)?;
        for event in &events {
            tracing::info!(workflow_id = %saved.id, event = event.name(), "workflow event");
        }
        self.broadcast(&saved, &events).await;
        Ok(saved)
    }

    /// Send roster broadcasts for the events that have broadcast text.
    /// Failures are logged, never raised.
    async fn broadcast(&self, instance: &WorkflowInstance, events: &[Event]) {
        for event in events {
            let Some(text) = self.composer.event_text(instance, event) else {
                continue;
            };
            for contact in instance.roster.iter() {
                let delivery = self
                    .notifier
                    .send(Channel::Chat, contact, &text, self.rules.notify_timeout)
                    .await;
                if !delivery.delivered {
                    tracing::warn!(
                        workflow_id = %instance.id,
                        recipient = %contact.name,
                        event = event.name(),
                        error = delivery.error.as_deref(),
                        "broadcast delivery failed"
                    );
                }
            }
        }
    }

    /// Patch an escalation's delivery status with a small bounded retry.
    /// A concurrent writer may move the version under us; delivery status
    /// is the only field touched, so replaying onto the fresh copy is safe.
    fn patch_delivery(&self, id: &WorkflowId, escalation_id: &str, status: DeliveryStatus) {
        for _ in 0..3 {
            let current = match self.store.load(id) {
                Ok(current) => current,
                Err(e) => {
                    tracing::warn!(workflow_id = %id, error = %e, "delivery patch: load failed");
                    return;
                }
            };
            let mut next = current.clone();
            let Some(record) = next
                .escalations
                .iter_mut()
                .find(|r| r.id == escalation_id)
            else {
                tracing::warn!(workflow_id = %id, escalation_id, "delivery patch: record gone");
                return;
            };
            record.delivery_status = status.clone();

            match self.store.save(&next, current.version) {
                Ok(_) => return,
                Err(StoreError::VersionConflict { .. }) => continue,
                Err(e) => {
                    tracing::warn!(workflow_id = %id, error = %e, "delivery patch: save failed");
                    return;
                }
            }
        }
        tracing::warn!(
            workflow_id = %id,
            escalation_id,
            "delivery patch: gave up after repeated version conflicts"
        );
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
