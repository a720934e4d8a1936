//! Resolves where the run configuration is read from.

use std::path::PathBuf;

use tierwatch_core::settings::Settings;
use tierwatch_core::{AppConfig, ConfigError, ConfigSource};
use tierwatch_storage::{CloudflareKvStore, FlagStore};

/// Key the config document is stored under in the KV namespace.
pub const CONFIG_KV_KEY: &str = "config";

pub enum ConfigLocation {
    Local(ConfigSource),
    Kv(CloudflareKvStore),
}

impl ConfigLocation {
    /// Inline JSON wins, then a configured KV namespace, then the file path.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Self::resolve(settings, None)
    }

    /// Like [`from_settings`](Self::from_settings), but a path given on the
    /// command line beats every other source.
    pub fn resolve(settings: &Settings, explicit_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit_path {
            return Ok(Self::Local(ConfigSource::File(path)));
        }
        if settings.config.inline_json.is_some() {
            return Ok(Self::Local(settings.config.source()));
        }
        if let Some(namespace) = &settings.cloudflare.config_namespace_id {
            let kv = CloudflareKvStore::from_settings(&settings.cloudflare, namespace.clone())
                .map_err(|e| ConfigError::Store(e.to_string()))?;
            return Ok(Self::Kv(kv));
        }
        Ok(Self::Local(settings.config.source()))
    }

    pub async fn load(&self) -> Result<AppConfig, ConfigError> {
        match self {
            Self::Local(source) => source.load(),
            Self::Kv(kv) => {
                let text = kv
                    .get(CONFIG_KV_KEY)
                    .await
                    .map_err(|e| ConfigError::Store(e.to_string()))?
                    .ok_or_else(|| {
                        ConfigError::Missing(format!(
                            "key '{CONFIG_KV_KEY}' not found in KV namespace {}",
                            kv.namespace_id()
                        ))
                    })?;
                AppConfig::from_json(&text)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Local(ConfigSource::Inline(_)) => "inline JSON".to_string(),
            Self::Local(ConfigSource::File(path)) => format!("file {}", path.display()),
            Self::Kv(kv) => format!("KV namespace {}", kv.namespace_id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tierwatch_core::settings::CloudflareSettings;

    fn settings() -> Settings {
        let mut settings = Settings::for_profile("TIERWATCH_CONFIG_SOURCE_TEST");
        settings.config.inline_json = None;
        settings.config.path = PathBuf::from("config/config.json");
        settings.cloudflare = CloudflareSettings::default();
        settings
    }

    #[test]
    fn file_by_default() {
        let location = ConfigLocation::from_settings(&settings()).unwrap();
        assert_eq!(location.describe(), "file config/config.json");
    }

    #[test]
    fn kv_when_namespace_configured() {
        let mut settings = settings();
        settings.cloudflare = CloudflareSettings {
            account_id: Some("acct".into()),
            api_token: Some("token".into()),
            config_namespace_id: Some("cfg-ns".into()),
            ..Default::default()
        };
        let location = ConfigLocation::from_settings(&settings).unwrap();
        assert_eq!(location.describe(), "KV namespace cfg-ns");
    }

    #[test]
    fn inline_beats_kv() {
        let mut settings = settings();
        settings.config.inline_json = Some(r#"{"creators": []}"#.into());
        settings.cloudflare.config_namespace_id = Some("cfg-ns".into());
        let location = ConfigLocation::from_settings(&settings).unwrap();
        assert_eq!(location.describe(), "inline JSON");
    }

    #[test]
    fn explicit_path_beats_kv_and_inline() {
        let mut settings = settings();
        settings.config.inline_json = Some(r#"{"creators": []}"#.into());
        settings.cloudflare = CloudflareSettings {
            account_id: Some("acct".into()),
            api_token: Some("token".into()),
            config_namespace_id: Some("cfg-ns".into()),
            ..Default::default()
        };
        let location =
            ConfigLocation::resolve(&settings, Some(PathBuf::from("/etc/tierwatch.json"))).unwrap();
        assert_eq!(location.describe(), "file /etc/tierwatch.json");

        let location = ConfigLocation::resolve(&settings, None).unwrap();
        assert_eq!(location.describe(), "inline JSON");
    }

    #[test]
    fn kv_without_credentials_is_store_error() {
        let mut settings = settings();
        settings.cloudflare.config_namespace_id = Some("cfg-ns".into());
        assert!(matches!(
            ConfigLocation::from_settings(&settings),
            Err(ConfigError::Store(_))
        ));
    }

    #[tokio::test]
    async fn missing_file_is_config_missing() {
        let mut settings = settings();
        settings.config.path = PathBuf::from("/nonexistent/tierwatch/config.json");
        let location = ConfigLocation::from_settings(&settings).unwrap();
        assert!(matches!(location.load().await, Err(ConfigError::Missing(_))));
    }
}
