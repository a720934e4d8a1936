//! Page fetching and tier extraction.
//!
//! This crate provides:
//! - `PageFetcher` trait with a reqwest-backed `HttpFetcher`
//! - `TierExtractor` trait with the `PatreonTierExtractor` markup reader

pub mod error;
pub mod extract;
pub mod fetch;

pub use error::{ExtractError, FetchError};
pub use extract::{PatreonTierExtractor, TierExtractor};
pub use fetch::{HttpFetcher, PageFetcher};
