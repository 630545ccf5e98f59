// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced notifier wrapper for consistent observability

use async_trait::async_trait;
use sl_core::{Channel, Contact, Delivery, Notifier};
use std::time::Duration;

/// Wrapper that adds tracing to any Notifier
#[derive(Clone)]
pub struct TracedNotifier<N> {
    inner: N,
}

impl<N> TracedNotifier<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: Notifier> Notifier for TracedNotifier<N> {
    async fn send(
        &self,
        channel: Channel,
        recipient: &Contact,
        message: &str,
        timeout: Duration,
    ) -> Delivery {
        let span = tracing::info_span!("notify.send", channel = %channel, recipient = %recipient.name);
        let _guard = span.enter();

        tracing::info!(message_len = message.len(), "sending");

        let start = std::time::Instant::now();
        let delivery = self.inner.send(channel, recipient, message, timeout).await;
        let elapsed = start.elapsed();

        if delivery.delivered {
            tracing::info!(
                provider_id = delivery.provider_id.as_deref(),
                elapsed_ms = elapsed.as_millis() as u64,
                "delivered"
            );
        } else {
            tracing::warn!(
                error = delivery.error.as_deref(),
                elapsed_ms = elapsed.as_millis() as u64,
                "delivery failed"
            );
        }

        delivery
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
