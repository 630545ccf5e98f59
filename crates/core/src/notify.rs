// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifier contract
//!
//! Message delivery is an external concern. The engine persists state first
//! and then dispatches best-effort: a `Notifier` reports the outcome as data
//! and never propagates an error into the engine's transaction.

use crate::roster::Contact;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Delivery channel for a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Chat,
    Sms,
    Voice,
    Email,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Chat => write!(f, "chat"),
            Channel::Sms => write!(f, "sms"),
            Channel::Voice => write!(f, "voice"),
            Channel::Email => write!(f, "email"),
        }
    }
}

/// Outcome of a delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: bool,
    /// Provider-side message id, when the provider returned one
    pub provider_id: Option<String>,
    pub error: Option<String>,
}

impl Delivery {
    pub fn ok(provider_id: impl Into<String>) -> Self {
        Self {
            delivered: true,
            provider_id: Some(provider_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            delivered: false,
            provider_id: None,
            error: Some(error.into()),
        }
    }
}

/// Adapter trait for message delivery
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a message to a contact over a channel, bounded by `timeout`.
    /// Failure is reported in the returned `Delivery`, never as an error.
    async fn send(
        &self,
        channel: Channel,
        recipient: &Contact,
        message: &str,
        timeout: Duration,
    ) -> Delivery;
}
