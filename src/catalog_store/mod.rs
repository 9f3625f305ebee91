//! Catalog persistence backends.
//!
//! The canonical catalog is reloaded from the backing store at the start of
//! every read-path operation and rewritten wholesale at the end of every
//! write-path operation; implementations do not cache between calls.

mod memory_store;
mod synced_store;
mod tsv_store;

pub use memory_store::InMemoryCatalogStore;
pub use synced_store::DriveSyncedStore;
pub use tsv_store::TsvCatalogStore;

use crate::catalog::Catalog;
use anyhow::Result;
use async_trait::async_trait;

/// Storage backend for the catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Load the full catalog; an absent backing file yields an empty catalog.
    async fn load(&self) -> Result<Catalog>;

    /// Replace the persisted catalog wholesale.
    async fn save(&self, catalog: &Catalog) -> Result<()>;
}
