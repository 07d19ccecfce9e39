//! Notification channel configuration

use super::*;
use crate::core::models::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Alert forwarding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertingConfig {
    /// Telegram bot channel
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    /// Slack incoming webhook channel
    #[serde(default)]
    pub slack: Option<SlackConfig>,
    /// Generic JSON webhooks
    #[serde(default)]
    pub webhooks: Vec<WebhookConfig>,
    /// Per-channel delivery timeout in seconds
    #[serde(default = "default_channel_timeout")]
    pub channel_timeout_secs: u64,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            telegram: None,
            slack: None,
            webhooks: Vec::new(),
            channel_timeout_secs: default_channel_timeout(),
        }
    }
}

impl AlertingConfig {
    pub fn merge(mut self, other: Self) -> Self {
        if other.telegram.is_some() {
            self.telegram = other.telegram;
        }
        if other.slack.is_some() {
            self.slack = other.slack;
        }
        self.webhooks.extend(other.webhooks);
        if other.channel_timeout_secs != default_channel_timeout() {
            self.channel_timeout_secs = other.channel_timeout_secs;
        }
        self
    }

    pub fn channel_timeout(&self) -> Duration {
        Duration::from_secs(self.channel_timeout_secs)
    }

    /// Whether any channel is configured
    pub fn has_channels(&self) -> bool {
        self.telegram.is_some() || self.slack.is_some() || !self.webhooks.is_empty()
    }
}

fn default_min_severity() -> Severity {
    Severity::Low
}

/// Telegram bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    #[serde(default = "default_min_severity")]
    pub min_severity: Severity,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: default_telegram_api_base(),
            min_severity: default_min_severity(),
        }
    }
}

/// Slack incoming webhook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default = "default_min_severity")]
    pub min_severity: Severity,
}

impl SlackConfig {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            channel: None,
            min_severity: default_min_severity(),
        }
    }
}

/// Generic webhook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default = "default_min_severity")]
    pub min_severity: Severity,
}
