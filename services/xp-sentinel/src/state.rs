//! Per-profile change detection and interval selection

use std::time::Duration;

use rand::Rng;

use crate::config::PollingConfig;

/// Lowest color handed out at random; darker values vanish on a dark theme
const MIN_RANDOM_COLOR: u32 = 0x2F3136;
const MAX_COLOR: u32 = 0xFFFFFF;

/// Pick a decorative embed color
pub fn random_color() -> u32 {
    rand::thread_rng().gen_range(MIN_RANDOM_COLOR..=MAX_COLOR)
}

/// Interval and cooldown settings shared by every profile task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingPolicy {
    pub short_interval: Duration,
    pub long_interval: Duration,
    pub cooldown_cycles: u32,
    pub max_backoff: Duration,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self::from_config(&PollingConfig::default())
    }
}

impl PollingPolicy {
    pub fn from_config(config: &PollingConfig) -> Self {
        Self {
            short_interval: config.short_interval(),
            long_interval: config.long_interval(),
            cooldown_cycles: config.cooldown_cycles,
            max_backoff: config.max_backoff(),
        }
    }

    /// Short interval while cooling down, long interval otherwise
    pub fn interval_for(&self, cooldown_cycles: u32) -> Duration {
        if cooldown_cycles > 0 {
            self.short_interval
        } else {
            self.long_interval
        }
    }
}

/// A detected XP change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpChange {
    pub before: i64,
    pub after: i64,
}

impl XpChange {
    /// Signed difference, widened so any pair of readings fits
    pub fn delta(&self) -> i128 {
        i128::from(self.after) - i128::from(self.before)
    }
}

/// Outcome of feeding one cycle's XP reading into the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub change: Option<XpChange>,
    pub interval: Duration,
}

/// State of one watched profile, owned by its polling task
#[derive(Debug, Clone)]
pub struct MonitorState {
    profile_id: String,
    known_xp: Option<i64>,
    color: u32,
    cooldown_cycles: u32,
    consecutive_failures: u32,
}

impl MonitorState {
    pub fn new(profile_id: impl Into<String>, color: u32) -> Self {
        Self {
            profile_id: profile_id.into(),
            known_xp: None,
            color: color.min(MAX_COLOR),
            cooldown_cycles: 0,
            consecutive_failures: 0,
        }
    }

    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }

    pub fn known_xp(&self) -> Option<i64> {
        self.known_xp
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn cooldown_cycles(&self) -> u32 {
        self.cooldown_cycles
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Feed the XP read by a successful fetch.
    ///
    /// The first reading only sets the baseline. Any later difference, up or
    /// down, is reported as a change and restarts the cooldown. A cycle with no
    /// reading leaves the state as it was.
    pub fn observe(&mut self, xp: Option<i64>, policy: &PollingPolicy) -> Observation {
        self.consecutive_failures = 0;

        let change = match (self.known_xp, xp) {
            (_, None) => None,
            (None, Some(baseline)) => {
                self.known_xp = Some(baseline);
                None
            }
            (Some(before), Some(after)) if before != after => {
                self.known_xp = Some(after);
                self.cooldown_cycles = policy.cooldown_cycles;
                Some(XpChange { before, after })
            }
            (Some(_), Some(_)) => {
                self.cooldown_cycles = self.cooldown_cycles.saturating_sub(1);
                None
            }
        };

        Observation {
            change,
            interval: policy.interval_for(self.cooldown_cycles),
        }
    }

    /// Record a failed fetch and return how long to wait before retrying.
    ///
    /// Waits the long interval, doubling with every consecutive failure up to
    /// `max_backoff`. XP and cooldown are left alone.
    pub fn record_fetch_failure(&mut self, policy: &PollingPolicy) -> Duration {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let factor = 1u32
            .checked_shl(self.consecutive_failures - 1)
            .unwrap_or(u32::MAX);
        policy
            .long_interval
            .saturating_mul(factor)
            .min(policy.max_backoff)
    }
}
