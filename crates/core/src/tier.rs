use std::fmt;

use serde::{Deserialize, Serialize};

/// Availability of a tier as read off the creator's page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierStatus {
    Available,
    SoldOut,
    Unknown,
}

impl TierStatus {
    pub fn is_available(self) -> bool {
        matches!(self, TierStatus::Available)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TierStatus::Available => "available",
            TierStatus::SoldOut => "sold_out",
            TierStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TierStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named subscription level extracted from one page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    pub status: TierStatus,
}

impl Tier {
    pub fn new(name: impl Into<String>, status: TierStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}
