// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notifier for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use async_trait::async_trait;
use sl_core::{Channel, Contact, Delivery, Notifier};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded notification
#[derive(Debug, Clone)]
pub struct NotifyCall {
    pub channel: Channel,
    pub recipient: String,
    pub message: String,
}

/// Fake notifier that records sends and can be scripted to fail
#[derive(Clone, Default)]
pub struct FakeNotifier {
    calls: Arc<Mutex<Vec<NotifyCall>>>,
    fail_with: Arc<Mutex<Option<String>>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded notifications
    pub fn calls(&self) -> Vec<NotifyCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Make every subsequent send fail with `error`
    pub fn fail_with(&self, error: impl Into<String>) {
        *self.fail_with.lock().unwrap_or_else(|e| e.into_inner()) = Some(error.into());
    }

    /// Clear a scripted failure
    pub fn succeed(&self) {
        *self.fail_with.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(
        &self,
        channel: Channel,
        recipient: &Contact,
        message: &str,
        _timeout: Duration,
    ) -> Delivery {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(NotifyCall {
                channel,
                recipient: recipient.name.clone(),
                message: message.to_string(),
            });

        let fail = self.fail_with.lock().unwrap_or_else(|e| e.into_inner()).clone();
        match fail {
            Some(error) => Delivery::failed(error),
            None => Delivery::ok(format!(
                "fake-{}",
                self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
            )),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
