// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Console notifier: logs instead of delivering
//!
//! Useful for local runs and dry-run configs where no gateway is wired
//! up. Every send "succeeds".

use async_trait::async_trait;
use sl_core::{Channel, Contact, Delivery, Notifier};
use std::time::Duration;

#[derive(Clone, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(
        &self,
        channel: Channel,
        recipient: &Contact,
        message: &str,
        _timeout: Duration,
    ) -> Delivery {
        tracing::info!(
            channel = %channel,
            recipient = %recipient.name,
            message,
            "notification (console)"
        );
        Delivery::ok("console")
    }
}
