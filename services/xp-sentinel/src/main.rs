//! XP Sentinel CLI
//!
//! Command-line interface for the profile experience watcher.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use xp_sentinel::{load_config, XpSentinelBuilder};

#[derive(Parser)]
#[command(name = "xp-sentinel")]
#[command(about = "Watches profile pages for experience changes and posts webhook notifications")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Mention this user id on large changes (overrides config file)
    #[arg(long)]
    mention_id: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, mention_id={:?}, log_level={:?}",
        args.config,
        args.mention_id,
        args.log_level
    );

    tracing::debug!("Loading configuration from {:?}", args.config);
    let mut config = load_config(&args.config)?;
    config.resolve_secrets()?;

    if let Some(mention_id) = args.mention_id {
        config.webhook.mention_id = Some(mention_id);
    }

    tracing::info!("Starting xp-sentinel service");
    tracing::debug!(
        "Profiles: {}, short interval: {}s, long interval: {}s",
        config.profiles.len(),
        config.polling.short_interval_seconds,
        config.polling.long_interval_seconds
    );

    XpSentinelBuilder::new(config).build()?.start().await?;

    Ok(())
}
