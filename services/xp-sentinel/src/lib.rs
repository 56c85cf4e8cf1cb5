//! XP Sentinel - profile experience watcher
//!
//! Polls profile pages, detects experience changes, and posts webhook notifications.

pub mod bootstrap;
pub mod config;
pub mod embed;
pub mod engine;
pub mod error;
pub mod fields;
pub mod io;
pub mod notifier;
pub mod profile_client;
pub mod snapshot;
pub mod source;
pub mod state;
pub mod webhook;

pub use config::{load_config, Config};
pub use error::{Result, XpSentinelError};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::engine::{Engine, WatchSettings};
use crate::io::{HttpClient, ReqwestHttpClient};
use crate::notifier::Notifier;
use crate::profile_client::HttpProfileSource;
use crate::source::ProfileSource;
use crate::state::{random_color, MonitorState};
use crate::webhook::WebhookNotifier;

/// Assembles an [`XpSentinel`] from configuration, with optional injected collaborators
pub struct XpSentinelBuilder {
    config: Config,
    http: Option<Arc<dyn HttpClient>>,
    source: Option<Arc<dyn ProfileSource>>,
    notifier: Option<Arc<dyn Notifier>>,
    cancel: Option<CancellationToken>,
}

impl XpSentinelBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: None,
            source: None,
            notifier: None,
            cancel: None,
        }
    }

    /// Use this HTTP client for both fetching and delivery
    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_source(mut self, source: Arc<dyn ProfileSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Result<XpSentinel> {
        self.config.validate()?;

        let http: Arc<dyn HttpClient> = match self.http {
            Some(http) => http,
            None => Arc::new(ReqwestHttpClient::new(&self.config.http)?),
        };

        let source: Arc<dyn ProfileSource> = match self.source {
            Some(source) => source,
            None => Arc::new(HttpProfileSource::new(&self.config.http, Arc::clone(&http))),
        };
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::new(WebhookNotifier::new(&self.config.webhook, Arc::clone(&http))),
        };

        let profiles: Vec<MonitorState> = self
            .config
            .profiles
            .iter()
            .map(|profile| {
                let color = profile.color.unwrap_or_else(random_color);
                tracing::debug!("Profile '{}' uses color #{:06X}", profile.id, color);
                MonitorState::new(profile.id.clone(), color)
            })
            .collect();

        let cancel = self.cancel.unwrap_or_default();
        let engine = Engine::new(
            profiles,
            source,
            notifier,
            WatchSettings::from_config(&self.config),
            cancel.clone(),
        );

        Ok(XpSentinel {
            engine,
            cancel,
            profile_count: self.config.profiles.len(),
        })
    }
}

/// A configured service ready to run
pub struct XpSentinel {
    engine: Engine,
    cancel: CancellationToken,
    profile_count: usize,
}

impl XpSentinel {
    /// Token that stops every polling task when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run until ctrl-c or until the cancellation token fires
    pub async fn start(self) -> Result<()> {
        let cancel_for_signal = self.cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                    cancel_for_signal.cancel();
                }
                Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
            }
        });

        self.run().await
    }

    /// Run until the cancellation token fires
    pub async fn run(self) -> Result<()> {
        tracing::info!("XP sentinel started, watching {} profile(s)", self.profile_count);

        self.engine.run().await;

        tracing::info!("XP sentinel stopped");
        Ok(())
    }
}
