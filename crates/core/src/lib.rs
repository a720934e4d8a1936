pub mod alert;
pub mod config;
pub mod error;
pub mod settings;
pub mod tier;

pub use alert::{Alert, FlagKey};
pub use config::{AppConfig, ConfigSource, Creator, SmsSettings};
pub use error::*;
pub use settings::Settings;
pub use tier::{Tier, TierStatus};
