//! Notifier trait and webhook payload types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body posted to the webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
}

impl WebhookPayload {
    pub fn new(embed: Embed, mention: Option<String>) -> Self {
        Self {
            content: mention,
            embeds: vec![embed],
        }
    }
}

/// A rich embed describing one XP change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub color: u32,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: &str, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline,
        }
    }
}

/// Trait for delivering notifications
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Deliver a payload
    async fn notify(&self, payload: &WebhookPayload) -> crate::Result<()>;
}
