//! In-process trigger for `watch` mode.
//!
//! Runs are either cron-driven or spaced by a fixed interval. The loop
//! ticks once a second and starts a run when one is due; runs never
//! overlap because each one is awaited before the next tick.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tracing::{debug, info};

/// Normalize a 5-field cron expression to 6-field by prepending "0 " for seconds.
///
/// The `cron` crate requires 6 fields: `sec min hour day-of-month month day-of-week`.
/// Operators usually write standard 5-field cron: `min hour day-of-month month day-of-week`.
pub fn normalize_cron(cron_5field: &str) -> String {
    let trimmed = cron_5field.trim();
    let field_count = trimmed.split_whitespace().count();
    if field_count == 5 {
        format!("0 {}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Check if a cron schedule is due at `now`.
///
/// Due if a scheduled tick falls after `last_run` (exclusive) and at or
/// before `now`. Without a previous run, only a tick within the last
/// minute counts, so starting the watcher does not fire for old ticks.
pub fn is_cron_due(
    schedule: &Schedule,
    now: DateTime<Utc>,
    last_run: Option<DateTime<Utc>>,
) -> bool {
    let check_from = last_run.unwrap_or(now - chrono::Duration::minutes(1));
    match schedule.after(&check_from).next() {
        Some(next) => next <= now,
        None => false,
    }
}

/// When to trigger a run.
#[derive(Debug, Clone)]
pub enum Trigger {
    Cron(Box<Schedule>),
    Every(Duration),
}

impl Trigger {
    pub fn cron(expr: &str) -> Result<Self, cron::error::Error> {
        let schedule = Schedule::from_str(&normalize_cron(expr))?;
        Ok(Trigger::Cron(Box::new(schedule)))
    }

    pub fn every(interval: Duration) -> Self {
        Trigger::Every(interval)
    }

    /// Interval triggers fire immediately on start, then every `interval`.
    pub fn is_due(&self, now: DateTime<Utc>, last_run: Option<DateTime<Utc>>) -> bool {
        match self {
            Trigger::Cron(schedule) => is_cron_due(schedule, now, last_run),
            Trigger::Every(interval) => match last_run {
                None => true,
                Some(last) => {
                    let elapsed = now.signed_duration_since(last);
                    chrono::Duration::from_std(*interval).is_ok_and(|interval| elapsed >= interval)
                }
            },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Trigger::Cron(schedule) => format!("cron '{}'", schedule),
            Trigger::Every(interval) => format!("every {}s", interval.as_secs()),
        }
    }
}

/// Call `run` whenever `trigger` is due, until `shutdown` resolves.
pub async fn watch<F, Fut, S>(trigger: &Trigger, mut run: F, shutdown: S)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
    S: Future<Output = ()>,
{
    info!(trigger = %trigger.describe(), "Watching for tier availability");
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last_run: Option<DateTime<Utc>> = None;

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping watcher");
                break;
            }
            _ = ticker.tick() => {
                let now = Utc::now();
                if !trigger.is_due(now, last_run) {
                    continue;
                }
                debug!(%now, "Run due");
                last_run = Some(now);
                run().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn normalize_five_field() {
        assert_eq!(normalize_cron("*/5 * * * *"), "0 */5 * * * *");
    }

    #[test]
    fn normalize_six_field_passthrough() {
        assert_eq!(normalize_cron("30 */5 * * * *"), "30 */5 * * * *");
    }

    #[test]
    fn invalid_cron_rejected() {
        assert!(Trigger::cron("not a cron").is_err());
    }

    #[test]
    fn cron_due_after_tick() {
        let trigger = Trigger::cron("*/5 * * * *").unwrap();
        let last = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let before_tick = Utc.with_ymd_and_hms(2025, 1, 1, 12, 4, 59).unwrap();
        let at_tick = Utc.with_ymd_and_hms(2025, 1, 1, 12, 5, 0).unwrap();

        assert!(!trigger.is_due(before_tick, Some(last)));
        assert!(trigger.is_due(at_tick, Some(last)));
        // Same tick does not fire twice.
        assert!(!trigger.is_due(at_tick, Some(at_tick)));
    }

    #[test]
    fn cron_first_run_waits_for_recent_tick() {
        let trigger = Trigger::cron("0 * * * *").unwrap();
        let mid_hour = Utc.with_ymd_and_hms(2025, 1, 1, 12, 30, 0).unwrap();
        let just_after = Utc.with_ymd_and_hms(2025, 1, 1, 13, 0, 1).unwrap();
        assert!(!trigger.is_due(mid_hour, None));
        assert!(trigger.is_due(just_after, None));
    }

    #[test]
    fn interval_due() {
        let trigger = Trigger::every(Duration::from_secs(300));
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert!(trigger.is_due(start, None));
        assert!(!trigger.is_due(start + chrono::Duration::seconds(299), Some(start)));
        assert!(trigger.is_due(start + chrono::Duration::seconds(300), Some(start)));
    }

    #[tokio::test(start_paused = true)]
    async fn watch_runs_until_shutdown() {
        let count = Arc::new(AtomicUsize::new(0));
        let trigger = Trigger::every(Duration::from_secs(3600));
        let counter = count.clone();

        watch(
            &trigger,
            || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            },
            tokio::time::sleep(Duration::from_secs(5)),
        )
        .await;

        // Fires immediately on start, then not again within the hour.
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
