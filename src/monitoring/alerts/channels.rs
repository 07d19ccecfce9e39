//! Notification channel implementations

use crate::config::{AlertingConfig, SlackConfig, TelegramConfig, WebhookConfig};
use crate::core::models::Severity;
use crate::utils::error::{MonitorError, Result};
use crate::utils::net::{ClientUtils, HttpClientConfig};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Notification channel trait
#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync + std::fmt::Debug {
    /// Deliver a rendered alert
    async fn notify(&self, text: &str) -> Result<()>;

    /// Get channel name
    fn name(&self) -> &str;

    /// Lowest severity forwarded to this channel
    fn min_severity(&self) -> Severity;

    /// Check if channel supports severity level
    fn supports_severity(&self, severity: Severity) -> bool {
        severity >= self.min_severity()
    }
}

/// Telegram bot channel
#[derive(Debug)]
pub struct TelegramChannel {
    client: Client,
    send_url: String,
    chat_id: String,
    min_severity: Severity,
}

impl TelegramChannel {
    pub fn new(client: Client, config: &TelegramConfig) -> Self {
        let send_url = ClientUtils::add_path_to_base(
            &config.api_base,
            &format!("bot{}/sendMessage", config.bot_token),
        );
        Self {
            client,
            send_url,
            chat_id: config.chat_id.clone(),
            min_severity: config.min_severity,
        }
    }
}

#[async_trait::async_trait]
impl NotificationChannel for TelegramChannel {
    async fn notify(&self, text: &str) -> Result<()> {
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        let response = self
            .client
            .post(&self.send_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                MonitorError::notification(format!("Failed to send Telegram message: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(MonitorError::notification(format!(
                "Telegram API returned status: {}",
                response.status()
            )));
        }

        debug!(chat_id = %self.chat_id, "telegram message sent");
        Ok(())
    }

    fn name(&self) -> &str {
        "telegram"
    }

    fn min_severity(&self) -> Severity {
        self.min_severity
    }
}

/// Slack incoming webhook channel
#[derive(Debug)]
pub struct SlackChannel {
    client: Client,
    webhook_url: String,
    channel: Option<String>,
    min_severity: Severity,
}

impl SlackChannel {
    pub fn new(client: Client, config: &SlackConfig) -> Self {
        Self {
            client,
            webhook_url: config.webhook_url.clone(),
            channel: config.channel.clone(),
            min_severity: config.min_severity,
        }
    }
}

#[async_trait::async_trait]
impl NotificationChannel for SlackChannel {
    async fn notify(&self, text: &str) -> Result<()> {
        let mut payload = serde_json::json!({
            "username": "Fleet Monitor",
            "text": text,
        });
        if let Some(channel) = &self.channel {
            payload["channel"] = serde_json::Value::String(channel.clone());
        }

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                MonitorError::notification(format!("Failed to send Slack notification: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(MonitorError::notification(format!(
                "Slack webhook returned status: {}",
                response.status()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "slack"
    }

    fn min_severity(&self) -> Severity {
        self.min_severity
    }
}

/// Generic JSON webhook channel
#[derive(Debug)]
pub struct WebhookChannel {
    client: Client,
    name: String,
    url: String,
    headers: HashMap<String, String>,
    min_severity: Severity,
}

impl WebhookChannel {
    pub fn new(client: Client, config: &WebhookConfig) -> Self {
        Self {
            client,
            name: config.name.clone(),
            url: config.url.clone(),
            headers: config.headers.clone(),
            min_severity: config.min_severity,
        }
    }
}

#[async_trait::async_trait]
impl NotificationChannel for WebhookChannel {
    async fn notify(&self, text: &str) -> Result<()> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "text": text }));
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| {
            MonitorError::notification(format!("Webhook {} failed: {}", self.name, e))
        })?;

        if !response.status().is_success() {
            return Err(MonitorError::notification(format!(
                "Webhook {} returned status: {}",
                self.name,
                response.status()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn min_severity(&self) -> Severity {
        self.min_severity
    }
}

/// Instantiate every configured channel
///
/// All channels share one connection pool whose timeout is the channel timeout.
pub fn build_channels(config: &AlertingConfig) -> Result<Vec<Arc<dyn NotificationChannel>>> {
    let client = ClientUtils::create_http_client(&HttpClientConfig {
        timeout: config.channel_timeout(),
        ..Default::default()
    })?;

    let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();
    if let Some(telegram) = &config.telegram {
        channels.push(Arc::new(TelegramChannel::new(client.clone(), telegram)));
    }
    if let Some(slack) = &config.slack {
        channels.push(Arc::new(SlackChannel::new(client.clone(), slack)));
    }
    for webhook in &config.webhooks {
        channels.push(Arc::new(WebhookChannel::new(client.clone(), webhook)));
    }
    Ok(channels)
}
