//! Process-level settings read from the environment.
//!
//! These decide *where* things live (config document, flag store,
//! timeouts). What to watch lives in [`AppConfig`](crate::AppConfig).

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ConfigSource;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level settings ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Active profile name (empty = default).
    pub profile: String,
    pub config: ConfigSettings,
    pub flag_store: FlagStoreSettings,
    pub cloudflare: CloudflareSettings,
    pub fetch: FetchSettings,
}

impl Settings {
    /// Build settings from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TIERWATCH_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("TIERWATCH_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let cloudflare = CloudflareSettings::from_env_profiled(p);
        Self {
            profile: p.to_string(),
            config: ConfigSettings::from_env_profiled(p),
            flag_store: FlagStoreSettings::from_env_profiled(p, &cloudflare),
            cloudflare,
            fetch: FetchSettings::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Settings loaded (profile: {}):", self.profile_label());
        tracing::info!("  config:      {}", self.config.describe());
        tracing::info!("  flag store:  {}", self.flag_store.describe());
        tracing::info!(
            "  cloudflare:  account={}, configured={}",
            self.cloudflare.account_id.as_deref().unwrap_or("(none)"),
            self.cloudflare.is_configured()
        );
        tracing::info!("  fetch:       timeout={}s", self.fetch.timeout_secs);
    }
}

// ── Run config location ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSettings {
    /// Inline JSON; wins over `path` when set.
    pub inline_json: Option<String>,
    pub path: PathBuf,
}

impl ConfigSettings {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            inline_json: profiled_env_opt(p, "TIERWATCH_CONFIG_JSON"),
            path: PathBuf::from(profiled_env_or(p, "TIERWATCH_CONFIG", "config/config.json")),
        }
    }

    pub fn source(&self) -> ConfigSource {
        match &self.inline_json {
            Some(json) => ConfigSource::Inline(json.clone()),
            None => ConfigSource::File(self.path.clone()),
        }
    }

    fn describe(&self) -> String {
        match self.inline_json {
            Some(_) => "inline (TIERWATCH_CONFIG_JSON)".to_string(),
            None => format!("file {}", self.path.display()),
        }
    }
}

// ── Flag store ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagStoreKind {
    Memory,
    File,
    Cloudflare,
}

impl std::str::FromStr for FlagStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(FlagStoreKind::Memory),
            "file" => Ok(FlagStoreKind::File),
            "cloudflare" | "kv" => Ok(FlagStoreKind::Cloudflare),
            other => Err(format!("unknown flag store kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagStoreSettings {
    pub kind: FlagStoreKind,
    pub path: PathBuf,
    pub cloudflare: CloudflareSettings,
}

impl FlagStoreSettings {
    fn from_env_profiled(p: &str, cloudflare: &CloudflareSettings) -> Self {
        let kind = profiled_env_opt(p, "FLAG_STORE")
            .and_then(|v| match v.parse() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    tracing::warn!("{e}, falling back to file store");
                    None
                }
            })
            .unwrap_or(FlagStoreKind::File);
        Self {
            kind,
            path: PathBuf::from(profiled_env_or(p, "FLAG_STORE_PATH", "data/alert_flags.json")),
            cloudflare: cloudflare.clone(),
        }
    }

    fn describe(&self) -> String {
        match self.kind {
            FlagStoreKind::Memory => "memory (not durable)".to_string(),
            FlagStoreKind::File => format!("file {}", self.path.display()),
            FlagStoreKind::Cloudflare => format!(
                "cloudflare kv namespace={}",
                self.cloudflare.alert_namespace_id.as_deref().unwrap_or("(none)")
            ),
        }
    }
}

// ── Cloudflare Workers KV ─────────────────────────────────────

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CloudflareSettings {
    pub account_id: Option<String>,
    pub api_token: Option<String>,
    pub alert_namespace_id: Option<String>,
    pub config_namespace_id: Option<String>,
}

impl std::fmt::Debug for CloudflareSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareSettings")
            .field("account_id", &self.account_id)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("alert_namespace_id", &self.alert_namespace_id)
            .field("config_namespace_id", &self.config_namespace_id)
            .finish()
    }
}

impl CloudflareSettings {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            account_id: profiled_env_opt(p, "CF_ACCOUNT_ID"),
            api_token: profiled_env_opt(p, "CF_API_TOKEN"),
            alert_namespace_id: profiled_env_opt(p, "CF_ALERT_NAMESPACE_ID"),
            config_namespace_id: profiled_env_opt(p, "CF_CONFIG_NAMESPACE_ID"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.account_id.is_some() && self.api_token.is_some()
    }
}

// ── Page fetch ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    pub timeout_secs: u64,
}

impl FetchSettings {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            timeout_secs: profiled_env_u64(p, "FETCH_TIMEOUT_SECS", 10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_store_kind_parses() {
        assert_eq!("memory".parse::<FlagStoreKind>().unwrap(), FlagStoreKind::Memory);
        assert_eq!("FILE".parse::<FlagStoreKind>().unwrap(), FlagStoreKind::File);
        assert_eq!("kv".parse::<FlagStoreKind>().unwrap(), FlagStoreKind::Cloudflare);
        assert!("redis".parse::<FlagStoreKind>().is_err());
    }

    #[test]
    fn profile_prefix_overrides_plain_key() {
        std::env::set_var("TWTEST_FETCH_TIMEOUT_SECS", "42");
        let settings = Settings::for_profile("twtest");
        assert_eq!(settings.profile, "TWTEST");
        assert_eq!(settings.fetch.timeout_secs, 42);
        std::env::remove_var("TWTEST_FETCH_TIMEOUT_SECS");
    }

    #[test]
    fn inline_json_wins_over_path() {
        let settings = ConfigSettings {
            inline_json: Some("{}".into()),
            path: PathBuf::from("config/config.json"),
        };
        assert!(matches!(settings.source(), ConfigSource::Inline(_)));

        let settings = ConfigSettings {
            inline_json: None,
            path: PathBuf::from("config/config.json"),
        };
        assert!(matches!(settings.source(), ConfigSource::File(_)));
    }

    #[test]
    fn debug_redacts_api_token() {
        let cf = CloudflareSettings {
            api_token: Some("very-secret".into()),
            ..Default::default()
        };
        let rendered = format!("{cf:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
