//! Run orchestration for tierwatch.
//!
//! This crate provides:
//! - `compute_alerts`: rising-edge detection over a creator's watch-list
//! - `Orchestrator`: fetch, extract, track, and dispatch for every creator
//! - `ConfigLocation`: inline, file, or KV-backed run configuration
//! - `Trigger` and `watch`: cron or fixed-interval repetition

pub mod app;
pub mod config_source;
pub mod orchestrator;
pub mod scheduler;
pub mod tracker;

pub use app::{build_orchestrator, run_once, RunError};
pub use config_source::ConfigLocation;
pub use orchestrator::{CreatorError, Orchestrator, RunSummary};
pub use scheduler::{watch, Trigger};
pub use tracker::compute_alerts;
