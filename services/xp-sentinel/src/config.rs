//! Configuration types for the xp-sentinel service

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides `webhook.url`
pub const WEBHOOK_URL_ENV: &str = "XP_SENTINEL_WEBHOOK_URL";

/// Upper bound for `polling.cooldown_cycles`
pub const MAX_COOLDOWN_CYCLES: u32 = 10;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// A single watched profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub id: String,
    /// Embed color; a random one is picked at startup when absent
    #[serde(default)]
    pub color: Option<u32>,
}

/// Webhook delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub url: String,
    /// User id to mention on large changes
    #[serde(default)]
    pub mention_id: Option<String>,
    #[serde(default = "default_mention_threshold")]
    pub mention_threshold: i64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            mention_id: None,
            mention_threshold: default_mention_threshold(),
        }
    }
}

/// Adaptive polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_short_interval")]
    pub short_interval_seconds: u64,
    #[serde(default = "default_long_interval")]
    pub long_interval_seconds: u64,
    /// Short-interval polls after a change, `0..=MAX_COOLDOWN_CYCLES`
    #[serde(default = "default_cooldown_cycles")]
    pub cooldown_cycles: u32,
    #[serde(default = "default_max_backoff")]
    pub max_backoff_seconds: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            short_interval_seconds: default_short_interval(),
            long_interval_seconds: default_long_interval(),
            cooldown_cycles: default_cooldown_cycles(),
            max_backoff_seconds: default_max_backoff(),
        }
    }
}

impl PollingConfig {
    pub fn short_interval(&self) -> Duration {
        Duration::from_secs(self.short_interval_seconds)
    }

    pub fn long_interval(&self) -> Duration {
        Duration::from_secs(self.long_interval_seconds)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_seconds)
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Profile page URL, `{id}` is replaced with the profile id
    #[serde(default = "default_profile_url_template")]
    pub profile_url_template: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
            profile_url_template: default_profile_url_template(),
        }
    }
}

fn default_mention_threshold() -> i64 {
    500
}

fn default_short_interval() -> u64 {
    180
}

fn default_long_interval() -> u64 {
    3600
}

fn default_cooldown_cycles() -> u32 {
    10
}

fn default_max_backoff() -> u64 {
    4 * 3600
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; KogamaXPWatcher/2.0)".to_string()
}

fn default_timeout() -> u64 {
    20
}

fn default_profile_url_template() -> String {
    "https://www.kogama.com/profile/{id}/".to_string()
}

impl Config {
    /// Apply overrides from the environment
    pub fn resolve_secrets(&mut self) -> crate::Result<()> {
        if let Ok(url) = std::env::var(WEBHOOK_URL_ENV) {
            tracing::debug!("Using webhook URL from {}", WEBHOOK_URL_ENV);
            self.apply_webhook_override(url);
        }
        Ok(())
    }

    fn apply_webhook_override(&mut self, url: String) {
        if !url.trim().is_empty() {
            self.webhook.url = url;
        }
    }

    /// Check the configuration for values the service cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.profiles.is_empty() {
            return Err(config_error("at least one profile is required"));
        }

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if profile.id.trim().is_empty() {
                return Err(config_error("profile id must not be empty"));
            }
            if !seen.insert(profile.id.as_str()) {
                return Err(config_error(&format!(
                    "profile '{}' is listed more than once",
                    profile.id
                )));
            }
        }

        if self.webhook.url.trim().is_empty() {
            return Err(config_error(&format!(
                "webhook.url is empty (set it in the file or via {})",
                WEBHOOK_URL_ENV
            )));
        }

        let polling = &self.polling;
        if polling.short_interval_seconds == 0 || polling.long_interval_seconds == 0 {
            return Err(config_error("polling intervals must be greater than zero"));
        }
        if polling.short_interval_seconds > polling.long_interval_seconds {
            return Err(config_error(
                "short_interval_seconds must not exceed long_interval_seconds",
            ));
        }
        if polling.cooldown_cycles > MAX_COOLDOWN_CYCLES {
            return Err(config_error(&format!(
                "cooldown_cycles must be at most {}",
                MAX_COOLDOWN_CYCLES
            )));
        }
        if polling.max_backoff_seconds < polling.long_interval_seconds {
            return Err(config_error(
                "max_backoff_seconds must be at least long_interval_seconds",
            ));
        }

        if !self.http.profile_url_template.contains("{id}") {
            return Err(config_error("profile_url_template must contain '{id}'"));
        }

        Ok(())
    }
}

fn config_error(message: &str) -> crate::XpSentinelError {
    crate::XpSentinelError::Config(message.to_string())
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::XpSentinelError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
