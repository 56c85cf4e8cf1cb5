//! Engine: one polling task per profile, change detection and dispatch

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::{self, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::bootstrap::extract_embedded_object;
use crate::config::Config;
use crate::embed::{build_embed, mention_for};
use crate::fields::parse_profile_fields;
use crate::notifier::{Notifier, WebhookPayload};
use crate::snapshot::ProfileSnapshot;
use crate::source::ProfileSource;
use crate::state::{MonitorState, PollingPolicy, XpChange};

/// Read-only settings shared by every polling task
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub policy: PollingPolicy,
    pub mention_id: Option<String>,
    pub mention_threshold: i64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl WatchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: PollingPolicy::from_config(&config.polling),
            mention_id: config.webhook.mention_id.clone(),
            mention_threshold: config.webhook.mention_threshold,
        }
    }
}

/// The engine runs an independent polling loop for every profile
pub struct Engine {
    profiles: Vec<MonitorState>,
    source: Arc<dyn ProfileSource>,
    notifier: Arc<dyn Notifier>,
    settings: Arc<WatchSettings>,
    cancel: CancellationToken,
}

impl Engine {
    pub fn new(
        profiles: Vec<MonitorState>,
        source: Arc<dyn ProfileSource>,
        notifier: Arc<dyn Notifier>,
        settings: WatchSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            profiles,
            source,
            notifier,
            settings: Arc::new(settings),
            cancel,
        }
    }

    /// Start polling all profiles. Returns when the cancellation token is triggered.
    ///
    /// A polling task that panics is logged as soon as it ends and restarted
    /// for the same profile from a fresh baseline after the short interval.
    pub async fn run(self) {
        let mut tasks = JoinSet::new();
        let mut owners: HashMap<task::Id, (String, u32)> = HashMap::new();

        for state in self.profiles.iter().cloned() {
            self.spawn_loop(&mut tasks, &mut owners, state, Duration::ZERO);
        }

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                Some(joined) = tasks.join_next_with_id() => match joined {
                    Ok((id, ())) => {
                        owners.remove(&id);
                    }
                    Err(e) => {
                        let Some((profile_id, color)) = owners.remove(&e.id()) else {
                            continue;
                        };
                        tracing::error!(
                            "Polling task for profile '{}' ended abnormally, restarting: {}",
                            profile_id,
                            e
                        );
                        self.spawn_loop(
                            &mut tasks,
                            &mut owners,
                            MonitorState::new(profile_id, color),
                            self.settings.policy.short_interval,
                        );
                    }
                },
            }
        }

        // Wait for all polling tasks to finish
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("Polling task ended abnormally during shutdown: {}", e);
            }
        }
    }

    fn spawn_loop(
        &self,
        tasks: &mut JoinSet<()>,
        owners: &mut HashMap<task::Id, (String, u32)>,
        state: MonitorState,
        start_after: Duration,
    ) {
        let owner = (state.profile_id().to_string(), state.color());
        let source = Arc::clone(&self.source);
        let notifier = Arc::clone(&self.notifier);
        let settings = Arc::clone(&self.settings);
        let cancel = self.cancel.clone();

        tracing::debug!("Starting polling loop for profile '{}'", owner.0);
        let handle = tasks.spawn(async move {
            poll_loop(state, source, notifier, settings, cancel, start_after).await;
        });
        owners.insert(handle.id(), owner);
    }
}

async fn poll_loop(
    mut state: MonitorState,
    source: Arc<dyn ProfileSource>,
    notifier: Arc<dyn Notifier>,
    settings: Arc<WatchSettings>,
    cancel: CancellationToken,
    start_after: Duration,
) {
    if !start_after.is_zero() {
        tokio::select! {
            _ = tokio::time::sleep(start_after) => {}
            _ = cancel.cancelled() => return,
        }
    }

    loop {
        let interval = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            interval = run_cycle(&mut state, source.as_ref(), notifier.as_ref(), &settings) => interval,
        };

        tracing::debug!(
            "Profile '{}' sleeping {:?} (cooldown={})",
            state.profile_id(),
            interval,
            state.cooldown_cycles()
        );

        // Wait for the next poll or cancellation
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => break,
        }
    }

    tracing::debug!("Polling loop for '{}' cancelled", state.profile_id());
}

/// Run one fetch, parse, decide and notify step. Returns how long to sleep.
///
/// A failed fetch backs off instead of ending the loop; a failed delivery is
/// logged and does not affect change tracking.
pub async fn run_cycle(
    state: &mut MonitorState,
    source: &dyn ProfileSource,
    notifier: &dyn Notifier,
    settings: &WatchSettings,
) -> Duration {
    let page = match source.fetch_page(state.profile_id()).await {
        Ok(page) => page,
        Err(e) => {
            let wait = state.record_fetch_failure(&settings.policy);
            tracing::warn!(
                "Fetching profile '{}' failed ({} in a row), retrying in {:?}: {}",
                state.profile_id(),
                state.consecutive_failures(),
                wait,
                e
            );
            return wait;
        }
    };

    let snapshot = read_snapshot(&page);
    let previous = state.known_xp();
    let observation = state.observe(snapshot.xp, &settings.policy);

    tracing::debug!(
        "Poll '{}': {:?} -> {:?} (changed={})",
        state.profile_id(),
        previous,
        snapshot.xp,
        observation.change.is_some()
    );

    if let Some(change) = observation.change {
        tracing::info!(
            "Profile '{}' XP changed {} -> {}",
            state.profile_id(),
            change.before,
            change.after
        );

        let profile_url = source.profile_url(state.profile_id());
        if let Err(e) =
            dispatch_notification(state, &snapshot, change, &profile_url, notifier, settings).await
        {
            tracing::warn!(
                "Notification for profile '{}' failed: {}",
                state.profile_id(),
                e
            );
        }
    }

    observation.interval
}

/// Parse a fetched page into this cycle's snapshot
pub fn read_snapshot(page: &str) -> ProfileSnapshot {
    let embedded = extract_embedded_object(page);
    let fields = parse_profile_fields(page);
    ProfileSnapshot::assemble(embedded.as_ref(), fields)
}

/// Build the payload for a change and hand it to the notifier
pub async fn dispatch_notification(
    state: &MonitorState,
    snapshot: &ProfileSnapshot,
    change: XpChange,
    profile_url: &str,
    notifier: &dyn Notifier,
    settings: &WatchSettings,
) -> crate::Result<()> {
    let embed = build_embed(
        snapshot,
        state.profile_id(),
        profile_url,
        change,
        state.color(),
        Utc::now(),
    );
    let mention = mention_for(
        change.delta(),
        settings.mention_id.as_deref(),
        settings.mention_threshold,
    );

    notifier.notify(&WebhookPayload::new(embed, mention)).await
}
