// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook notifier
//!
//! Posts each notification as a JSON document to a gateway endpoint that
//! fans out to the real chat/SMS/voice/email providers. The HTTP client
//! is blocking, so calls run on the tokio blocking pool.

use async_trait::async_trait;
use sl_core::{Channel, Contact, Delivery, Notifier};
use std::time::Duration;

/// Notifier that delivers through an HTTP gateway
#[derive(Clone)]
pub struct WebhookNotifier {
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    fn post(url: &str, payload: String, timeout: Duration) -> Delivery {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        let result = agent
            .post(url)
            .header("content-type", "application/json")
            .send(payload.as_str());

        match result {
            Ok(mut response) => {
                // The gateway echoes a provider message id in the body
                match response.body_mut().read_to_string() {
                    Ok(body) if !body.trim().is_empty() => Delivery::ok(body.trim()),
                    _ => Delivery::ok(format!("http-{}", response.status())),
                }
            }
            Err(e) => Delivery::failed(format!("webhook post failed: {e}")),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(
        &self,
        channel: Channel,
        recipient: &Contact,
        message: &str,
        timeout: Duration,
    ) -> Delivery {
        let Some(address) = recipient.address_for(channel) else {
            return Delivery::failed(format!(
                "contact {} has no address for channel {channel}",
                recipient.name
            ));
        };

        let payload = serde_json::json!({
            "channel": channel,
            "to": address,
            "recipient": recipient.name,
            "message": message,
        })
        .to_string();

        let url = self.url.clone();
        match tokio::task::spawn_blocking(move || Self::post(&url, payload, timeout)).await {
            Ok(delivery) => delivery,
            Err(e) => Delivery::failed(format!("webhook task failed: {e}")),
        }
    }
}
