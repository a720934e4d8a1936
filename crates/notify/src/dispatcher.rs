//! Sends one SMS per newly available tier.
//!
//! Every alert is logged before delivery is attempted. If the provider
//! is not fully configured the whole batch is skipped; individual send
//! failures are logged and do not stop the remaining alerts. Nothing is
//! retried, and alert flags are never rolled back on failure.

use tierwatch_core::Alert;

use crate::traits::{DispatchResult, Notifier, SmsMessage};

/// Outcome of one [`AlertDispatcher::dispatch`] call.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub results: Vec<DispatchResult>,
    /// Set when the batch was skipped because the provider is unusable.
    pub aborted: Option<String>,
}

impl DispatchReport {
    pub fn delivered(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }
}

pub struct AlertDispatcher {
    notifier: Box<dyn Notifier>,
}

impl AlertDispatcher {
    pub fn new(notifier: Box<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub fn channel_name(&self) -> &str {
        self.notifier.channel_name()
    }

    /// Deliver `alerts` in order through the configured provider.
    pub async fn dispatch(&self, alerts: &[Alert]) -> DispatchReport {
        if alerts.is_empty() {
            return DispatchReport::default();
        }

        for alert in alerts {
            tracing::info!(
                "ALERT: Tier \"{}\" for creator \"{}\" is now available! {}",
                alert.tier_name,
                alert.creator_name,
                alert.url
            );
        }

        let channel = self.notifier.channel_name();

        if let Err(e) = self.notifier.ensure_configured() {
            tracing::error!(
                channel,
                alerts = alerts.len(),
                error = %e,
                "SMS provider not usable, skipping this batch"
            );
            return DispatchReport {
                results: Vec::new(),
                aborted: Some(e.to_string()),
            };
        }

        let mut results = Vec::with_capacity(alerts.len());

        for alert in alerts {
            let message = SmsMessage::for_alert(alert);
            let start = std::time::Instant::now();
            let result = self.notifier.send(&message).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let (success, error) = match result {
                Ok(()) => {
                    tracing::info!(
                        creator = %alert.creator_name,
                        tier = %alert.tier_name,
                        channel,
                        duration_ms,
                        "Alert delivered"
                    );
                    (true, None)
                }
                Err(e) => {
                    tracing::warn!(
                        creator = %alert.creator_name,
                        tier = %alert.tier_name,
                        channel,
                        error = %e,
                        duration_ms,
                        "Alert delivery failed"
                    );
                    (false, Some(e.to_string()))
                }
            };

            results.push(DispatchResult {
                channel: channel.to_string(),
                creator_name: alert.creator_name.clone(),
                tier_name: alert.tier_name.clone(),
                success,
                error,
                duration_ms,
            });
        }

        DispatchReport {
            results,
            aborted: None,
        }
    }
}
