//! One run over every configured creator.
//!
//! Creators are processed strictly one after another. Any failure while
//! handling a creator (fetch, extraction, flag store) is logged and that
//! creator is skipped; the run always moves on to the next one.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use tierwatch_core::{Alert, AppConfig, Creator};
use tierwatch_notify::AlertDispatcher;
use tierwatch_scrape::{ExtractError, FetchError, PageFetcher, TierExtractor};
use tierwatch_storage::{FlagStore, StorageError};

/// Why a creator was skipped this run.
#[derive(Debug, thiserror::Error)]
pub enum CreatorError {
    #[error("no URL configured")]
    MissingUrl,

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("flag store failed: {0}")]
    Storage(#[from] StorageError),
}

/// Counters for the end-of-run log line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub creators_checked: usize,
    pub creators_skipped: usize,
    pub alerts_raised: usize,
    pub alerts_delivered: usize,
    /// Batches skipped because the SMS provider was not usable.
    pub batches_aborted: usize,
}

pub struct Orchestrator {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn TierExtractor>,
    flags: Arc<dyn FlagStore>,
    dispatcher: AlertDispatcher,
    creator_delay: Duration,
}

impl Orchestrator {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn TierExtractor>,
        flags: Arc<dyn FlagStore>,
        dispatcher: AlertDispatcher,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            flags,
            dispatcher,
            creator_delay: Duration::ZERO,
        }
    }

    /// Pause between creators.
    pub fn with_creator_delay(mut self, delay: Duration) -> Self {
        self.creator_delay = delay;
        self
    }

    pub async fn run(&self, config: &AppConfig) -> RunSummary {
        let mut summary = RunSummary::default();

        if config.creators.is_empty() {
            warn!("No creators configured to monitor");
            return summary;
        }

        info!(
            creators = config.creators.len(),
            flag_store = self.flags.backend_name(),
            channel = self.dispatcher.channel_name(),
            "Starting check run"
        );

        for (i, creator) in config.creators.iter().enumerate() {
            if i > 0 && !self.creator_delay.is_zero() {
                tokio::time::sleep(self.creator_delay).await;
            }

            let alerts = match self.check_creator(creator).await {
                Ok(alerts) => alerts,
                Err(e) => {
                    match e {
                        CreatorError::Storage(_) => {
                            error!(creator = %creator.name, error = %e, "Skipping creator")
                        }
                        _ => warn!(creator = %creator.name, error = %e, "Skipping creator"),
                    }
                    summary.creators_skipped += 1;
                    continue;
                }
            };
            summary.creators_checked += 1;

            if alerts.is_empty() {
                continue;
            }
            summary.alerts_raised += alerts.len();

            let report = self.dispatcher.dispatch(&alerts).await;
            summary.alerts_delivered += report.delivered();
            if report.aborted.is_some() {
                summary.batches_aborted += 1;
            }
        }

        info!(
            checked = summary.creators_checked,
            skipped = summary.creators_skipped,
            alerts = summary.alerts_raised,
            delivered = summary.alerts_delivered,
            batches_aborted = summary.batches_aborted,
            "Check run complete"
        );
        summary
    }

    /// Fetch, extract, and evaluate one creator.
    async fn check_creator(&self, creator: &Creator) -> Result<Vec<Alert>, CreatorError> {
        if creator.url.trim().is_empty() {
            return Err(CreatorError::MissingUrl);
        }

        info!(creator = %creator.name, url = %creator.url, "Checking creator");
        let markup = self.fetcher.fetch(&creator.url).await?;
        let tiers = self.extractor.extract(&markup)?;
        info!(creator = %creator.name, tiers = tiers.len(), "Scraped tiers");

        let alerts = crate::tracker::compute_alerts(&tiers, creator, self.flags.as_ref()).await?;
        Ok(alerts)
    }
}
