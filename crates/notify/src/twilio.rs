//! Twilio Programmable Messaging notifier.
//!
//! Sends each message as a form-encoded `POST` to the account's
//! `Messages.json` resource, authenticated with HTTP basic auth
//! (account SID + auth token).

use tierwatch_core::config::TwilioSettings;

use crate::env::setting;
use crate::traits::{require_fields, Notifier, NotifyError, SmsMessage};

const DEFAULT_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug)]
pub struct TwilioNotifier {
    account_sid: Option<String>,
    auth_token: Option<String>,
    from_number: Option<String>,
    to_number: Option<String>,
    api_base: String,
    client: reqwest::Client,
}

impl TwilioNotifier {
    /// Build from config. Incomplete settings are accepted here and
    /// reported by [`Notifier::ensure_configured`] at dispatch time.
    pub fn from_settings(settings: &TwilioSettings) -> Self {
        Self {
            account_sid: setting("twilio_account_sid", settings.twilio_account_sid.as_ref()),
            auth_token: setting("twilio_auth_token", settings.twilio_auth_token.as_ref()),
            from_number: setting("twilio_from_number", settings.twilio_from_number.as_ref()),
            to_number: setting("recipient_phone_number", settings.recipient_phone_number.as_ref()),
            api_base: DEFAULT_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, account_sid
        )
    }
}

/// Form fields for one message.
fn message_form<'a>(from: &'a str, to: &'a str, message: &'a SmsMessage) -> [(&'a str, &'a str); 3] {
    [("From", from), ("To", to), ("Body", message.body.as_str())]
}

#[async_trait::async_trait]
impl Notifier for TwilioNotifier {
    fn ensure_configured(&self) -> Result<(), NotifyError> {
        require_fields(
            "Twilio",
            &[
                ("twilio_account_sid", self.account_sid.as_deref()),
                ("twilio_auth_token", self.auth_token.as_deref()),
                ("twilio_from_number", self.from_number.as_deref()),
                ("recipient_phone_number", self.to_number.as_deref()),
            ],
        )
    }

    async fn send(&self, message: &SmsMessage) -> Result<(), NotifyError> {
        let (Some(sid), Some(token), Some(from), Some(to)) = (
            self.account_sid.as_deref(),
            self.auth_token.as_deref(),
            self.from_number.as_deref(),
            self.to_number.as_deref(),
        ) else {
            return self.ensure_configured();
        };

        let response = self
            .client
            .post(self.messages_url(sid))
            .basic_auth(sid, Some(token))
            .form(&message_form(from, to, message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(%status, body = %body, "Twilio rejected message");
            return Err(NotifyError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let resp_body: serde_json::Value = response.json().await.unwrap_or_default();
        tracing::info!(
            to = %to,
            message_sid = resp_body.get("sid").and_then(|v| v.as_str()).unwrap_or("?"),
            "Twilio SMS sent"
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "twilio"
    }
}
