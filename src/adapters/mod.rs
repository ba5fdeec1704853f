// Adapters layer: concrete implementations of the domain ports (feed stores, file storage).

pub mod file_store;
pub mod memory;
pub mod rest;
pub mod snapshot;
pub mod storage;

use crate::config::toml_config::{StoreConfig, StoreKind};
use crate::core::FeedStore;
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;
use std::path::Path;
use std::time::Duration;

pub use file_store::FileFeedStore;
pub use memory::InMemoryFeedStore;
pub use rest::RestFeedStore;
pub use snapshot::StoreSnapshot;
pub use storage::LocalStorage;

/// Picks the feed store described by the `[store]` section.
pub fn store_from_config(config: &StoreConfig) -> Result<Box<dyn FeedStore>> {
    match config.kind {
        StoreKind::File => {
            let path = Path::new(&config.path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| config.path.clone());

            tracing::debug!("Using file store at {}", path.display());
            Ok(Box::new(FileFeedStore::new(LocalStorage::new(dir), file_name)))
        }
        StoreKind::Rest => {
            let endpoint = validate_required_field("store.endpoint", &config.endpoint)?;
            tracing::debug!("Using REST store at {}", endpoint);
            Ok(Box::new(RestFeedStore::new(
                endpoint,
                Duration::from_secs(config.timeout_seconds),
                &config.headers,
            )?))
        }
    }
}
