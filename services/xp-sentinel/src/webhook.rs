//! Webhook notification client

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::WebhookConfig;
use crate::io::HttpClient;
use crate::notifier::{Notifier, WebhookPayload};

/// Posts payloads as JSON to a chat webhook
pub struct WebhookNotifier {
    url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for WebhookNotifier {
    // The URL embeds the webhook token, keep it out of logs
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier").finish_non_exhaustive()
    }
}

impl WebhookNotifier {
    pub fn new(config: &WebhookConfig, http: Arc<dyn HttpClient>) -> Self {
        tracing::debug!("Created WebhookNotifier");
        Self {
            url: config.url.clone(),
            http,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, payload: &WebhookPayload) -> crate::Result<()> {
        let body = serde_json::to_value(payload)?;

        tracing::debug!(
            "Sending webhook notification with {} embed(s), mention={}",
            payload.embeds.len(),
            payload.content.is_some()
        );

        let response = self
            .http
            .post_json(&self.url, &body)
            .await
            .map_err(|e| crate::XpSentinelError::Delivery(e.to_string()))?;

        if !response.is_success() {
            return Err(crate::XpSentinelError::Delivery(format!(
                "webhook returned status {}: {}",
                response.status, response.body
            )));
        }

        tracing::debug!("Webhook notification delivered");
        Ok(())
    }
}
