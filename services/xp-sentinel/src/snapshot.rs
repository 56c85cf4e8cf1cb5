//! Per-cycle profile snapshot
//!
//! Merges the bootstrap object with the selector pass. The bootstrap object
//! wins for XP; the page markup only fills in when it has nothing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::fields::{normalize_int, ProfileFields};

/// What a single poll learned about a profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub title: Option<String>,
    pub xp: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub level: Option<i64>,
    pub rank: Option<i64>,
    pub last_ping_epoch: Option<i64>,
}

impl ProfileSnapshot {
    /// Combine the embedded bootstrap object (if any) with the parsed page fields
    pub fn assemble(embedded: Option<&Value>, fields: ProfileFields) -> Self {
        let object = embedded.and_then(|value| value.get("object"));
        let stat = |key: &str| object.and_then(|o| o.get(key)).and_then(value_as_int);

        let last_ping_epoch = object
            .and_then(|o| o.get("last_ping"))
            .and_then(Value::as_str)
            .and_then(parse_iso_epoch);

        Self {
            title: fields.title,
            xp: stat("xp").or(fields.xp),
            thumbnail_url: fields.thumbnail_url,
            level: stat("level"),
            rank: stat("leaderboard_rank"),
            last_ping_epoch,
        }
    }
}

/// Read an integer from a JSON number or a formatted numeric string
fn value_as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => normalize_int(s),
        _ => None,
    }
}

/// Convert an ISO-8601 timestamp to UTC epoch seconds.
///
/// Timestamps carrying an offset are converted to UTC, so the offset shifts the
/// result rather than being dropped. Timestamps without one are taken to
/// already be UTC.
pub fn parse_iso_epoch(text: &str) -> Option<i64> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.timestamp());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().timestamp());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp())
}
