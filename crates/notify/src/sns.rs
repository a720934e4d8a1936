//! Amazon SNS notifier.
//!
//! Publishes straight to the recipient's phone number (no topic) with
//! the `Transactional` SMS type, using static credentials from the run
//! config. The SDK client is built on first send.

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_sns::config::Region;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::types::MessageAttributeValue;
use tokio::sync::OnceCell;

use tierwatch_core::config::AwsSnsSettings;

use crate::env::setting;
use crate::traits::{require_fields, Notifier, NotifyError, SmsMessage};

const SMS_TYPE_ATTRIBUTE: &str = "AWS.SNS.SMS.SMSType";
const SMS_TYPE_TRANSACTIONAL: &str = "Transactional";

pub struct SnsNotifier {
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    region: Option<String>,
    to_number: Option<String>,
    endpoint_url: Option<String>,
    client: OnceCell<aws_sdk_sns::Client>,
}

impl SnsNotifier {
    pub fn from_settings(settings: &AwsSnsSettings) -> Self {
        Self {
            access_key_id: setting("aws_access_key_id", settings.aws_access_key_id.as_ref()),
            secret_access_key: setting(
                "aws_secret_access_key",
                settings.aws_secret_access_key.as_ref(),
            ),
            region: setting("aws_region", settings.aws_region.as_ref()),
            to_number: setting("recipient_phone_number", settings.recipient_phone_number.as_ref()),
            endpoint_url: None,
            client: OnceCell::new(),
        }
    }

    /// Send to a different SNS endpoint (e.g. LocalStack).
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    async fn client(&self, access_key_id: &str, secret: &str, region: &str) -> &aws_sdk_sns::Client {
        self.client
            .get_or_init(|| async {
                let credentials =
                    Credentials::new(access_key_id, secret, None, None, "tierwatch-sns");
                let mut loader = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(region.to_string()))
                    .credentials_provider(credentials);
                if let Some(endpoint) = &self.endpoint_url {
                    loader = loader.endpoint_url(endpoint);
                }
                let config = loader.load().await;
                aws_sdk_sns::Client::new(&config)
            })
            .await
    }
}

#[async_trait::async_trait]
impl Notifier for SnsNotifier {
    fn ensure_configured(&self) -> Result<(), NotifyError> {
        require_fields(
            "AWS SNS",
            &[
                ("aws_access_key_id", self.access_key_id.as_deref()),
                ("aws_secret_access_key", self.secret_access_key.as_deref()),
                ("aws_region", self.region.as_deref()),
                ("recipient_phone_number", self.to_number.as_deref()),
            ],
        )
    }

    async fn send(&self, message: &SmsMessage) -> Result<(), NotifyError> {
        let (Some(key), Some(secret), Some(region), Some(to)) = (
            self.access_key_id.as_deref(),
            self.secret_access_key.as_deref(),
            self.region.as_deref(),
            self.to_number.as_deref(),
        ) else {
            return self.ensure_configured();
        };

        let sms_type = MessageAttributeValue::builder()
            .data_type("String")
            .string_value(SMS_TYPE_TRANSACTIONAL)
            .build()
            .map_err(|e| NotifyError::Sns(e.to_string()))?;

        let output = self
            .client(key, secret, region)
            .await
            .publish()
            .phone_number(to)
            .message(message.body.as_str())
            .message_attributes(SMS_TYPE_ATTRIBUTE, sms_type)
            .send()
            .await
            .map_err(|e| {
                let detail = DisplayErrorContext(&e).to_string();
                tracing::warn!(to = %to, error = %detail, "SNS rejected message");
                NotifyError::Sns(detail)
            })?;

        tracing::info!(
            to = %to,
            message_id = output.message_id().unwrap_or("?"),
            "SNS SMS sent"
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "aws_sns"
    }
}
