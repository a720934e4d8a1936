//! Durable alert-flag storage.
//!
//! This crate provides:
//! - `FlagStore` trait: plain get/put/delete over string keys
//! - In-memory, JSON-file, and Cloudflare Workers KV backends
//! - `open_flag_store` to pick a backend from settings

pub mod cloudflare;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

use std::sync::Arc;

use tracing::info;

use tierwatch_core::settings::{FlagStoreKind, FlagStoreSettings};

pub use cloudflare::CloudflareKvStore;
pub use error::StorageError;
pub use file::JsonFileFlagStore;
pub use memory::MemoryFlagStore;
pub use traits::{FlagStore, FLAG_PRESENT};

/// Create the flag store selected by settings.
pub fn open_flag_store(settings: &FlagStoreSettings) -> Result<Arc<dyn FlagStore>, StorageError> {
    let store: Arc<dyn FlagStore> = match settings.kind {
        FlagStoreKind::Memory => {
            info!("Flag store: in-memory (flags are lost when the process exits)");
            Arc::new(MemoryFlagStore::new())
        }
        FlagStoreKind::File => {
            info!("Flag store: JSON file at {}", settings.path.display());
            Arc::new(JsonFileFlagStore::new(&settings.path))
        }
        FlagStoreKind::Cloudflare => {
            let cf = &settings.cloudflare;
            let namespace = cf.alert_namespace_id.clone().ok_or_else(|| {
                StorageError::NotConfigured("CF_ALERT_NAMESPACE_ID is not set".into())
            })?;
            let kv = CloudflareKvStore::from_settings(cf, namespace)?;
            info!("Flag store: Cloudflare KV namespace {}", kv.namespace_id());
            Arc::new(kv)
        }
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tierwatch_core::settings::CloudflareSettings;

    #[test]
    fn cloudflare_without_namespace_is_not_configured() {
        let settings = FlagStoreSettings {
            kind: FlagStoreKind::Cloudflare,
            path: "unused.json".into(),
            cloudflare: CloudflareSettings {
                account_id: Some("acct".into()),
                api_token: Some("token".into()),
                ..Default::default()
            },
        };
        assert!(matches!(
            open_flag_store(&settings),
            Err(StorageError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn memory_store_from_settings() {
        let settings = FlagStoreSettings {
            kind: FlagStoreKind::Memory,
            path: "unused.json".into(),
            cloudflare: CloudflareSettings::default(),
        };
        let store = open_flag_store(&settings).unwrap();
        store.put("Acme_Gold", FLAG_PRESENT).await.unwrap();
        assert!(store.contains("Acme_Gold").await.unwrap());
        assert_eq!(store.backend_name(), "memory");
    }
}
