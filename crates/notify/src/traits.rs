//! Notifier trait definition and shared error types.

use tierwatch_core::Alert;

/// Longest body sent as one message (two concatenated SMS segments).
pub const MAX_SMS_CHARS: usize = 320;

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials or recipient missing; nothing can be sent.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider rejected message ({status}): {body}")]
    Provider { status: u16, body: String },

    #[error("SNS publish failed: {0}")]
    Sns(String),
}

/// A rendered SMS body ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SmsMessage {
    pub body: String,
}

impl SmsMessage {
    /// Wrap `body`, truncating to [`MAX_SMS_CHARS`] with a trailing ellipsis.
    pub fn new(body: impl Into<String>) -> Self {
        let body = body.into();
        if body.chars().count() <= MAX_SMS_CHARS {
            return Self { body };
        }
        let mut truncated: String = body.chars().take(MAX_SMS_CHARS - 3).collect();
        truncated.push_str("...");
        Self { body: truncated }
    }

    pub fn for_alert(alert: &Alert) -> Self {
        Self::new(alert.message())
    }
}

/// Trait for outbound notification providers.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Check that credentials and recipient are present before a batch.
    ///
    /// Returns [`NotifyError::Config`] naming what is missing.
    fn ensure_configured(&self) -> Result<(), NotifyError>;

    /// Deliver one message to the configured recipient.
    async fn send(&self, message: &SmsMessage) -> Result<(), NotifyError>;

    /// Test connectivity with a sample message.
    async fn test(&self) -> Result<(), NotifyError> {
        self.ensure_configured()?;
        self.send(&SmsMessage::new(
            "tierwatch test: SMS delivery is configured correctly.",
        ))
        .await
    }

    /// Human-readable name for this provider (e.g., "twilio", "log").
    fn channel_name(&self) -> &str;
}

/// Result of sending a single alert.
#[derive(Debug)]
pub struct DispatchResult {
    pub channel: String,
    pub creator_name: String,
    pub tier_name: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Collect the names of unset fields, or `Ok` when none are missing.
pub(crate) fn require_fields(
    provider: &str,
    fields: &[(&str, Option<&str>)],
) -> Result<(), NotifyError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(NotifyError::Config(format!(
            "{provider} config incomplete, missing: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_untouched() {
        let msg = SmsMessage::new("hello");
        assert_eq!(msg.body, "hello");
    }

    #[test]
    fn long_body_truncated_with_ellipsis() {
        let msg = SmsMessage::new("x".repeat(400));
        assert_eq!(msg.body.chars().count(), MAX_SMS_CHARS);
        assert!(msg.body.ends_with("..."));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let msg = SmsMessage::new("é".repeat(MAX_SMS_CHARS + 1));
        assert_eq!(msg.body.chars().count(), MAX_SMS_CHARS);
    }

    #[test]
    fn alert_body_matches_format() {
        let alert = Alert {
            creator_name: "Acme".into(),
            tier_name: "Gold".into(),
            url: "https://www.patreon.com/acme".into(),
        };
        assert_eq!(
            SmsMessage::for_alert(&alert).body,
            "Patreon Alert: Tier 'Gold' for creator 'Acme' is now available! https://www.patreon.com/acme"
        );
    }

    #[test]
    fn require_fields_lists_missing() {
        let err = require_fields("twilio", &[("sid", Some("AC1")), ("token", None), ("to", Some(" "))])
            .unwrap_err();
        match err {
            NotifyError::Config(msg) => {
                assert!(msg.contains("token"));
                assert!(msg.contains("to"));
                assert!(!msg.contains("sid"));
            }
            other => panic!("expected Config error, got: {other:?}"),
        }
        assert!(require_fields("twilio", &[("sid", Some("AC1"))]).is_ok());
    }
}
