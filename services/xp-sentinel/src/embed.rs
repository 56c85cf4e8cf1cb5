//! Rendering XP changes into webhook embeds

use chrono::{DateTime, Utc};

use crate::notifier::{Embed, EmbedField, EmbedThumbnail};
use crate::snapshot::ProfileSnapshot;
use crate::state::XpChange;

/// Build the embed announcing `change` for a profile
pub fn build_embed(
    snapshot: &ProfileSnapshot,
    profile_id: &str,
    profile_url: &str,
    change: XpChange,
    color: u32,
    now: DateTime<Utc>,
) -> Embed {
    let title = snapshot
        .title
        .clone()
        .unwrap_or_else(|| format!("Profile {}", profile_id));

    let mut fields = vec![
        EmbedField::new(
            "XP",
            format!(
                "{} → {}",
                format_grouped(change.before),
                format_grouped(change.after)
            ),
            false,
        ),
        EmbedField::new("Δ", format_delta(change.delta()), true),
    ];
    if let Some(level) = snapshot.level {
        fields.push(EmbedField::new("Level", level.to_string(), true));
    }
    if let Some(rank) = snapshot.rank {
        fields.push(EmbedField::new("Rank", rank.to_string(), true));
    }
    if let Some(epoch) = snapshot.last_ping_epoch {
        fields.push(EmbedField::new("Last ping", relative_time(epoch), false));
    }

    Embed {
        title,
        url: profile_url.to_string(),
        color,
        timestamp: now.to_rfc3339(),
        thumbnail: snapshot
            .thumbnail_url
            .as_ref()
            .map(|url| EmbedThumbnail { url: url.clone() }),
        fields,
    }
}

/// Mention to attach when the change is larger than `threshold` in either direction
pub fn mention_for(
    delta: impl Into<i128>,
    mention_id: Option<&str>,
    threshold: i64,
) -> Option<String> {
    let id = mention_id.filter(|id| !id.is_empty())?;
    if delta.into().unsigned_abs() > u128::from(threshold.max(0).unsigned_abs()) {
        Some(format!("<@{}>", id))
    } else {
        None
    }
}

/// Format with comma thousands separators, e.g. `-1,234,567`
pub fn format_grouped(value: impl Into<i128>) -> String {
    let value = value.into();
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Signed, grouped delta: `+200`, `+0`, `-1,500`
pub fn format_delta(delta: impl Into<i128>) -> String {
    let delta = delta.into();
    if delta >= 0 {
        format!("+{}", format_grouped(delta))
    } else {
        format_grouped(delta)
    }
}

/// Discord relative timestamp markup
fn relative_time(epoch: i64) -> String {
    format!("<t:{}:R>", epoch)
}
