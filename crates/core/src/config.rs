// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch configuration
//!
//! Stage templates, escalation thresholds/routes, and sweep cadence are
//! data: loaded from TOML once at startup, validated, and treated as
//! immutable thereafter. Deployments retune thresholds without code
//! changes.

use crate::escalation::{EscalationPolicy, RecipientRole, TierRoute, TierThreshold};
use crate::notify::Channel;
use crate::template::{StageTemplate, StageTemplateTable, TemplateError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid stage templates: {0}")]
    Template(#[from] TemplateError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Escalation tuning: overdue thresholds, per-tier routes, cooldown window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<TierThreshold>,
    #[serde(default = "default_cooldown", with = "humantime_serde")]
    pub cooldown: Duration,
    #[serde(default = "default_routes")]
    pub routes: Vec<TierRoute>,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            thresholds: default_thresholds(),
            cooldown: default_cooldown(),
            routes: default_routes(),
        }
    }
}

/// Sweep cadence. The reference deployment ran reminders hourly and the
/// delay sweep every six hours; both are deployment choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_reminder_interval", with = "humantime_serde")]
    pub reminder_interval: Duration,
    #[serde(default = "default_delay_interval", with = "humantime_serde")]
    pub delay_interval: Duration,
    /// How far ahead of a deadline the reminder pass looks
    #[serde(default = "default_reminder_lookahead", with = "humantime_serde")]
    pub reminder_lookahead: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            reminder_interval: default_reminder_interval(),
            delay_interval: default_delay_interval(),
            reminder_lookahead: default_reminder_lookahead(),
        }
    }
}

/// Top-level configuration for the launch engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    #[serde(default = "default_stage_templates")]
    pub stages: Vec<StageTemplate>,
    #[serde(default)]
    pub escalation: EscalationConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    /// Upper bound on a single notifier dispatch
    #[serde(default = "default_notify_timeout", with = "humantime_serde")]
    pub notify_timeout: Duration,
    /// HTTP gateway for outbound notifications; without one, sends are
    /// logged instead of delivered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_gateway: Option<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            stages: default_stage_templates(),
            escalation: EscalationConfig::default(),
            sweep: SweepConfig::default(),
            notify_timeout: default_notify_timeout(),
            notify_gateway: None,
        }
    }
}

impl LaunchConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LaunchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.template_table()?;
        if self.escalation.cooldown.is_zero() {
            return Err(ConfigError::Invalid(
                "escalation cooldown must be positive".to_string(),
            ));
        }
        for threshold in &self.escalation.thresholds {
            if threshold.tier == 0 {
                return Err(ConfigError::Invalid(
                    "tier 0 is implicit (no action); thresholds must name tier >= 1".to_string(),
                ));
            }
            if self
                .escalation
                .routes
                .iter()
                .all(|r| r.tier != threshold.tier)
            {
                return Err(ConfigError::Invalid(format!(
                    "no route configured for tier {}",
                    threshold.tier
                )));
            }
        }
        Ok(())
    }

    /// Build the validated, immutable stage template table
    pub fn template_table(&self) -> Result<StageTemplateTable, ConfigError> {
        Ok(StageTemplateTable::new(self.stages.clone())?)
    }

    /// Build the escalation policy from the configured data
    pub fn escalation_policy(&self) -> Result<EscalationPolicy, ConfigError> {
        let cooldown = chrono::Duration::from_std(self.escalation.cooldown)
            .map_err(|e| ConfigError::Invalid(format!("cooldown out of range: {e}")))?;
        Ok(EscalationPolicy::new(
            self.escalation.thresholds.clone(),
            cooldown,
            self.escalation.routes.clone(),
        ))
    }
}

fn default_stage_templates() -> Vec<StageTemplate> {
    StageTemplateTable::reference().iter().cloned().collect()
}

fn default_thresholds() -> Vec<TierThreshold> {
    vec![
        TierThreshold {
            min_days_overdue: 3,
            tier: 1,
        },
        TierThreshold {
            min_days_overdue: 7,
            tier: 2,
        },
    ]
}

fn default_cooldown() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_routes() -> Vec<TierRoute> {
    vec![
        TierRoute {
            tier: 1,
            channel: Channel::Chat,
            recipient: RecipientRole::Assignee,
        },
        TierRoute {
            tier: 2,
            channel: Channel::Voice,
            recipient: RecipientRole::Manager,
        },
    ]
}

fn default_reminder_interval() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_delay_interval() -> Duration {
    Duration::from_secs(6 * 60 * 60)
}

fn default_reminder_lookahead() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_notify_timeout() -> Duration {
    Duration::from_secs(10)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
