//! tierwatch: checks Patreon creator pages and texts when a watched tier opens up.
//!
//! Modes:
//! - `run` (default): one pass over every configured creator, then exit
//! - `watch`: repeat runs on a cron schedule or fixed interval until Ctrl-C
//! - `test-notify`: send a test SMS through the configured provider

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use tierwatch_alerter::{run_once, watch, ConfigLocation, Trigger};
use tierwatch_core::settings::{load_dotenv, FlagStoreKind, Settings};
use tierwatch_notify::build_notifier;
use tierwatch_storage::open_flag_store;

// ── CLI ─────────────────────────────────────────────────────────────

/// Patreon tier availability alerter.
#[derive(Parser, Debug)]
#[command(name = "tierwatch", version, about)]
struct Cli {
    /// Path to the JSON run configuration. Overrides inline JSON and KV.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Flag store backend: memory, file, or cloudflare.
    #[arg(long, global = true)]
    flag_store: Option<FlagStoreKind>,

    /// Settings profile (overrides TIERWATCH_PROFILE).
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every creator once and exit.
    Run,

    /// Keep checking on a schedule until interrupted.
    Watch {
        /// Cron expression (5 or 6 fields). Takes precedence over --interval.
        #[arg(long, env = "TIERWATCH_CRON")]
        cron: Option<String>,

        /// Seconds between runs. Defaults to `check_interval_seconds` from the config.
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Send a test SMS through the configured provider.
    TestNotify,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();

    let mut settings = match &cli.profile {
        Some(profile) => Settings::for_profile(profile),
        None => Settings::from_env(),
    };
    if let Some(kind) = cli.flag_store {
        settings.flag_store.kind = kind;
    }
    settings.log_summary();

    let location = ConfigLocation::resolve(&settings, cli.config)?;
    info!(source = %location.describe(), "Run configuration source");

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let flags = open_flag_store(&settings.flag_store)?;
            let summary = run_once(&settings, &location, flags).await?;
            info!(?summary, "tierwatch run finished");
        }
        Command::Watch { cron, interval } => {
            let trigger = match (cron, interval) {
                (Some(expr), _) => Trigger::cron(&expr)
                    .with_context(|| format!("invalid cron expression '{expr}'"))?,
                (None, Some(secs)) => Trigger::every(Duration::from_secs(secs.max(1))),
                (None, None) => {
                    let config = location.load().await?;
                    Trigger::every(Duration::from_secs(config.check_interval_seconds.max(1)))
                }
            };
            let flags = open_flag_store(&settings.flag_store)?;
            let settings = &settings;
            let location = &location;

            watch(
                &trigger,
                || {
                    let flags = Arc::clone(&flags);
                    async move {
                        if let Err(e) = run_once(settings, location, flags).await {
                            warn!(error = %e, "run failed, waiting for next trigger");
                        }
                    }
                },
                async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!(error = %e, "could not listen for Ctrl-C");
                        std::future::pending::<()>().await;
                    }
                },
            )
            .await;
        }
        Command::TestNotify => {
            let config = location.load().await?;
            let notifier = build_notifier(config.sms_settings.as_ref());
            info!(channel = notifier.channel_name(), "sending test SMS");
            notifier
                .test()
                .await
                .with_context(|| format!("test SMS via {} failed", notifier.channel_name()))?;
            info!("test SMS sent");
        }
    }

    info!("tierwatch exited cleanly");
    Ok(())
}
