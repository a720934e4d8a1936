//! Wires settings, configuration, and adapters into a single run.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use tierwatch_core::settings::Settings;
use tierwatch_core::{AppConfig, ConfigError};
use tierwatch_notify::{build_notifier, AlertDispatcher};
use tierwatch_scrape::{HttpFetcher, PatreonTierExtractor};
use tierwatch_storage::FlagStore;

use crate::config_source::ConfigLocation;
use crate::orchestrator::{Orchestrator, RunSummary};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not build page fetcher: {0}")]
    Fetcher(#[from] tierwatch_scrape::FetchError),

    #[error("could not build tier extractor: {0}")]
    Extractor(#[from] tierwatch_scrape::ExtractError),
}

/// Build an orchestrator for `config` using the real HTTP fetcher and the
/// SMS provider named in its settings.
pub fn build_orchestrator(
    settings: &Settings,
    config: &AppConfig,
    flags: Arc<dyn FlagStore>,
) -> Result<Orchestrator, RunError> {
    let fetcher = HttpFetcher::new(
        &config.user_agent,
        Duration::from_secs(settings.fetch.timeout_secs),
    )?;
    let extractor = PatreonTierExtractor::new()?;
    let dispatcher = AlertDispatcher::new(build_notifier(config.sms_settings.as_ref()));

    Ok(Orchestrator::new(Arc::new(fetcher), Arc::new(extractor), flags, dispatcher)
        .with_creator_delay(Duration::from_secs(config.creator_delay_secs)))
}

/// Load the configuration and perform one full run.
///
/// A missing configuration aborts the run; everything past that point is
/// contained per creator by the orchestrator.
pub async fn run_once(
    settings: &Settings,
    location: &ConfigLocation,
    flags: Arc<dyn FlagStore>,
) -> Result<RunSummary, RunError> {
    let config = match location.load().await {
        Ok(config) => config,
        Err(e) => {
            error!(source = %location.describe(), error = %e, "Configuration could not be loaded, aborting run");
            return Err(e.into());
        }
    };
    info!(source = %location.describe(), "Configuration loaded");
    config.log_summary();

    let orchestrator = build_orchestrator(settings, &config, flags)?;
    Ok(orchestrator.run(&config).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use tierwatch_core::ConfigSource;
    use tierwatch_storage::MemoryFlagStore;

    #[tokio::test]
    async fn missing_config_aborts_run() {
        let settings = Settings::for_profile("TIERWATCH_APP_TEST");
        let location = ConfigLocation::Local(ConfigSource::File(PathBuf::from(
            "/nonexistent/tierwatch/config.json",
        )));
        let flags = Arc::new(MemoryFlagStore::new());

        let result = run_once(&settings, &location, flags.clone()).await;

        assert!(matches!(result, Err(RunError::Config(ConfigError::Missing(_)))));
        assert!(flags.is_empty().await);
    }

    #[tokio::test]
    async fn empty_creator_list_is_a_quiet_run() {
        let settings = Settings::for_profile("TIERWATCH_APP_TEST");
        let location = ConfigLocation::Local(ConfigSource::Inline(r#"{"creators": []}"#.into()));
        let flags = Arc::new(MemoryFlagStore::new());

        let summary = run_once(&settings, &location, flags).await.unwrap();
        assert_eq!(summary, RunSummary::default());
    }
}
