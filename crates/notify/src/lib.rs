//! SMS delivery for tier alerts.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable SMS providers
//! - Twilio, Amazon SNS, generic HTTP gateway, and log-only implementations
//! - `AlertDispatcher`, which sends one message per alert

pub mod dispatcher;
pub mod env;
pub mod http_sms;
pub mod provider;
pub mod sns;
pub mod traits;
pub mod twilio;

#[cfg(test)]
mod test_support;

pub use dispatcher::{AlertDispatcher, DispatchReport};
pub use provider::{build_notifier, LogNotifier};
pub use traits::{Notifier, NotifyError, SmsMessage};
