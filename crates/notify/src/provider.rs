//! Picks the notifier for a run from its `sms_settings`.

use tierwatch_core::SmsSettings;

use crate::http_sms::HttpSmsNotifier;
use crate::sns::SnsNotifier;
use crate::traits::{Notifier, NotifyError, SmsMessage};
use crate::twilio::TwilioNotifier;

/// Build the provider described by `settings`.
///
/// No settings means alerts are only logged. An unknown provider yields a
/// notifier that refuses every batch, so the problem shows up in the log
/// on each run rather than being silently ignored.
pub fn build_notifier(settings: Option<&SmsSettings>) -> Box<dyn Notifier> {
    match settings {
        None => Box::new(LogNotifier),
        Some(SmsSettings::Twilio(twilio)) => Box::new(TwilioNotifier::from_settings(twilio)),
        Some(SmsSettings::AwsSns(sns)) => Box::new(SnsNotifier::from_settings(sns)),
        Some(SmsSettings::Http(http)) => Box::new(HttpSmsNotifier::from_settings(http)),
        Some(SmsSettings::Unsupported) => Box::new(DisabledNotifier {
            reason: "SMS provider is configured but not supported; no SMS will be sent".into(),
        }),
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    fn ensure_configured(&self) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn send(&self, message: &SmsMessage) -> Result<(), NotifyError> {
        tracing::info!(body = %message.body, "SMS not configured, alert logged only");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "log"
    }
}

/// Provider that can never be used.
#[derive(Debug)]
pub struct DisabledNotifier {
    reason: String,
}

#[async_trait::async_trait]
impl Notifier for DisabledNotifier {
    fn ensure_configured(&self) -> Result<(), NotifyError> {
        Err(NotifyError::Config(self.reason.clone()))
    }

    async fn send(&self, _message: &SmsMessage) -> Result<(), NotifyError> {
        self.ensure_configured()
    }

    fn channel_name(&self) -> &str {
        "disabled"
    }
}
