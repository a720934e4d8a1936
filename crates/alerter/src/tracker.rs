//! Availability transition detection.
//!
//! A watched tier raises an alert only on its rising edge: the first run
//! that sees it available after a run that did not. The edge is remembered
//! as a flag in the [`FlagStore`]; observing the tier as not available
//! (sold out, unknown, or missing from the page) deletes the flag and
//! re-arms the watch.

use std::collections::HashMap;

use tracing::debug;

use tierwatch_core::{Alert, Creator, FlagKey, Tier};
use tierwatch_storage::{FlagStore, StorageError, FLAG_PRESENT};

/// Evaluate `creator`'s watch-list against freshly extracted `tiers`.
///
/// Returns alerts in watch-list order. Flag writes happen as each tier is
/// evaluated; on a storage error the flags already written stay written.
pub async fn compute_alerts(
    tiers: &[Tier],
    creator: &Creator,
    flags: &dyn FlagStore,
) -> Result<Vec<Alert>, StorageError> {
    let by_name = index_by_name(tiers);
    let mut alerts = Vec::new();

    for watched in &creator.tiers_to_watch {
        let key = FlagKey::new(&creator.name, watched).storage_key();
        let found = by_name.get(&watched.to_lowercase());

        match found {
            Some(tier) if tier.status.is_available() => {
                if flags.contains(&key).await? {
                    debug!(creator = %creator.name, tier = %watched, "available, already alerted");
                    continue;
                }
                alerts.push(Alert {
                    creator_name: creator.name.clone(),
                    tier_name: watched.clone(),
                    url: creator.url.clone(),
                });
                flags.put(&key, FLAG_PRESENT).await?;
                debug!(creator = %creator.name, tier = %watched, "newly available");
            }
            Some(tier) => {
                debug!(creator = %creator.name, tier = %watched, status = %tier.status, "not available, re-arming");
                flags.delete(&key).await?;
            }
            None => {
                debug!(creator = %creator.name, tier = %watched, "not on page, re-arming");
                flags.delete(&key).await?;
            }
        }
    }

    Ok(alerts)
}

/// Lower-cased name -> tier. A later tier with the same name replaces an earlier one.
fn index_by_name(tiers: &[Tier]) -> HashMap<String, &Tier> {
    let mut by_name = HashMap::with_capacity(tiers.len());
    for tier in tiers {
        if let Some(previous) = by_name.insert(tier.name.to_lowercase(), tier) {
            debug!(
                tier = %tier.name,
                replaced_status = %previous.status,
                status = %tier.status,
                "duplicate tier name on page, keeping the last one"
            );
        }
    }
    by_name
}
