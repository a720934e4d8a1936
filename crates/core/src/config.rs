//! Run configuration: which creators to watch and how to deliver alerts.
//!
//! The document is JSON, either inline (env var) or on disk:
//!
//! ```json
//! {
//!   "creators": [{ "name": "Acme", "url": "https://www.patreon.com/acme", "tiers_to_watch": ["Gold"] }],
//!   "user_agent": "Mozilla/5.0",
//!   "sms_settings": { "provider": "twilio", "twilio_account_sid": "AC..." }
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_USER_AGENT: &str = "Patreon Tier Alerter Bot/1.0";

/// Prefix the sample config uses for values the operator still has to fill in.
const PLACEHOLDER_PREFIX: &str = "YOUR_";

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_check_interval() -> u64 {
    3600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub creators: Vec<Creator>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Interval used by `watch` mode when no cron expression is given.
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// Pause between creators within one run, to stay polite to the site.
    #[serde(default)]
    pub creator_delay_secs: u64,
    #[serde(default)]
    pub sms_settings: Option<SmsSettings>,
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Run config loaded: {} creator(s)", self.creators.len());
        tracing::info!("  user_agent:  {}", self.user_agent);
        tracing::info!("  interval:    {}s", self.check_interval_seconds);
        match &self.sms_settings {
            Some(sms) => tracing::info!("  sms:         provider={}", sms.provider_name()),
            None => tracing::info!("  sms:         (not configured, log only)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub tiers_to_watch: Vec<String>,
}

/// Outbound SMS provider settings, tagged by `provider`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum SmsSettings {
    Twilio(TwilioSettings),
    /// Amazon SNS direct-to-phone SMS.
    AwsSns(AwsSnsSettings),
    /// Generic JSON gateway: `POST {to, token, message}`.
    Http(HttpSmsSettings),
    /// Any provider name this build does not know how to talk to.
    #[serde(other)]
    Unsupported,
}

impl SmsSettings {
    pub fn provider_name(&self) -> &'static str {
        match self {
            SmsSettings::Twilio(_) => "twilio",
            SmsSettings::AwsSns(_) => "aws_sns",
            SmsSettings::Http(_) => "http",
            SmsSettings::Unsupported => "unsupported",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwilioSettings {
    #[serde(default)]
    pub twilio_account_sid: Option<String>,
    #[serde(default)]
    pub twilio_auth_token: Option<String>,
    #[serde(default)]
    pub twilio_from_number: Option<String>,
    #[serde(default)]
    pub recipient_phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsSnsSettings {
    #[serde(default)]
    pub aws_access_key_id: Option<String>,
    #[serde(default)]
    pub aws_secret_access_key: Option<String>,
    #[serde(default)]
    pub aws_region: Option<String>,
    #[serde(default)]
    pub recipient_phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSmsSettings {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub recipient_phone_number: Option<String>,
}

/// True when a settings value is absent, blank, or still the sample placeholder.
pub fn is_unset(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => true,
        Some(v) => v.starts_with(PLACEHOLDER_PREFIX),
    }
}

/// Where the run configuration document comes from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// JSON text supplied directly (e.g. from an env var).
    Inline(String),
    /// JSON file on disk.
    File(PathBuf),
}

impl ConfigSource {
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        match self {
            ConfigSource::Inline(text) => {
                if text.trim().is_empty() {
                    return Err(ConfigError::Missing("inline configuration is empty".into()));
                }
                AppConfig::from_json(text)
            }
            ConfigSource::File(path) => {
                if !path.exists() {
                    return Err(ConfigError::Missing(format!(
                        "file not found: {}",
                        path.display()
                    )));
                }
                let text = std::fs::read_to_string(path)?;
                AppConfig::from_json(&text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let config = AppConfig::from_json(
            r#"{
                "creators": [
                    {"name": "Acme", "url": "https://www.patreon.com/acme", "tiers_to_watch": ["Gold", "Silver"]}
                ],
                "user_agent": "test-agent",
                "sms_settings": {
                    "provider": "twilio",
                    "twilio_account_sid": "AC123",
                    "twilio_auth_token": "secret",
                    "twilio_from_number": "+15550001",
                    "recipient_phone_number": "+15550002"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.creators.len(), 1);
        assert_eq!(config.creators[0].tiers_to_watch, vec!["Gold", "Silver"]);
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.check_interval_seconds, 3600);
        match config.sms_settings {
            Some(SmsSettings::Twilio(t)) => {
                assert_eq!(t.twilio_account_sid.as_deref(), Some("AC123"));
            }
            other => panic!("expected twilio settings, got {other:?}"),
        }
    }

    #[test]
    fn defaults_apply() {
        let config = AppConfig::from_json(r#"{"creators": []}"#).unwrap();
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.creator_delay_secs, 0);
        assert!(config.sms_settings.is_none());
    }

    #[test]
    fn unknown_provider_is_unsupported() {
        let config = AppConfig::from_json(
            r#"{"creators": [], "sms_settings": {"provider": "carrier_pigeon"}}"#,
        )
        .unwrap();
        assert_eq!(config.sms_settings, Some(SmsSettings::Unsupported));
    }

    #[test]
    fn parse_aws_sns_provider() {
        let config = AppConfig::from_json(
            r#"{
                "creators": [],
                "sms_settings": {
                    "provider": "aws_sns",
                    "aws_access_key_id": "AKIA123",
                    "aws_secret_access_key": "secret",
                    "aws_region": "us-east-1",
                    "recipient_phone_number": "+15550002"
                }
            }"#,
        )
        .unwrap();

        let sms = config.sms_settings.unwrap();
        assert_eq!(sms.provider_name(), "aws_sns");
        match sms {
            SmsSettings::AwsSns(sns) => {
                assert_eq!(sns.aws_region.as_deref(), Some("us-east-1"));
                assert_eq!(sns.recipient_phone_number.as_deref(), Some("+15550002"));
            }
            other => panic!("expected aws_sns settings, got {other:?}"),
        }
    }

    #[test]
    fn placeholders_count_as_unset() {
        assert!(is_unset(None));
        assert!(is_unset(Some("  ")));
        assert!(is_unset(Some("YOUR_RECIPIENT_PHONE_NUMBER")));
        assert!(!is_unset(Some("+15550002")));
    }

    #[test]
    fn missing_file_is_config_missing() {
        let source = ConfigSource::File(PathBuf::from("/definitely/not/here/config.json"));
        assert!(matches!(source.load(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn empty_inline_is_config_missing() {
        let source = ConfigSource::Inline("   ".into());
        assert!(matches!(source.load(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn malformed_inline_is_parse_error() {
        let source = ConfigSource::Inline("{not json".into());
        assert!(matches!(source.load(), Err(ConfigError::Parse(_))));
    }
}
