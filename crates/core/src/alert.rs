use std::fmt;

use serde::{Deserialize, Serialize};

/// One pending notification: a watched tier that just became available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub creator_name: String,
    pub tier_name: String,
    pub url: String,
}

impl Alert {
    /// Human-readable line used for both the SMS body and the log.
    pub fn message(&self) -> String {
        format!(
            "Patreon Alert: Tier '{}' for creator '{}' is now available! {}",
            self.tier_name, self.creator_name, self.url
        )
    }
}

/// Identity of an alert flag: one per (creator, watched tier).
///
/// Kept structured in memory and rendered as `"<creator>_<tier>"` only when
/// handed to a flag store, so existing caches keep working.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlagKey<'a> {
    pub creator: &'a str,
    pub tier: &'a str,
}

impl<'a> FlagKey<'a> {
    pub fn new(creator: &'a str, tier: &'a str) -> Self {
        Self { creator, tier }
    }

    pub fn storage_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FlagKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.creator, self.tier)
    }
}
