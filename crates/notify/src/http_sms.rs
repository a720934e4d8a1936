//! Generic HTTP SMS gateway notifier.
//!
//! Delivers each message as a JSON payload `{"to", "token", "message"}`
//! to a configured gateway URL. Values may reference environment
//! variables as `${VAR_NAME}`.

use tierwatch_core::config::HttpSmsSettings;

use crate::env::setting;
use crate::traits::{require_fields, Notifier, NotifyError, SmsMessage};

/// Request body accepted by the gateway.
#[derive(Debug, serde::Serialize)]
struct GatewayPayload<'a> {
    to: &'a str,
    token: &'a str,
    message: &'a str,
}

#[derive(Debug)]
pub struct HttpSmsNotifier {
    url: Option<String>,
    token: Option<String>,
    to_number: Option<String>,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl HttpSmsNotifier {
    pub fn from_settings(settings: &HttpSmsSettings) -> Self {
        Self {
            url: setting("api_url", settings.api_url.as_ref()),
            token: setting("api_token", settings.api_token.as_ref()),
            to_number: setting("recipient_phone_number", settings.recipient_phone_number.as_ref()),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for HttpSmsNotifier {
    fn ensure_configured(&self) -> Result<(), NotifyError> {
        require_fields(
            "HTTP SMS gateway",
            &[
                ("api_url", self.url.as_deref()),
                ("api_token", self.token.as_deref()),
                ("recipient_phone_number", self.to_number.as_deref()),
            ],
        )
    }

    async fn send(&self, message: &SmsMessage) -> Result<(), NotifyError> {
        let (Some(url), Some(token), Some(to)) = (
            self.url.as_deref(),
            self.token.as_deref(),
            self.to_number.as_deref(),
        ) else {
            return self.ensure_configured();
        };

        let payload = GatewayPayload {
            to,
            token,
            message: &message.body,
        };

        let response = self.client.post(url).json(&payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(
                url = %url,
                %status,
                body = %body_text,
                "SMS gateway returned non-2xx status"
            );
            return Err(NotifyError::Provider {
                status: status.as_u16(),
                body: body_text,
            });
        }

        tracing::debug!(url = %url, status = %status, "SMS gateway accepted message");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "http"
    }
}
