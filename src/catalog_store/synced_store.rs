//! Remote-drive synchronization wrapped around the local TSV store.

use super::{CatalogRepository, TsvCatalogStore};
use crate::catalog::Catalog;
use crate::drive::RemoteDrive;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Decorator that pulls the remote copy of the catalog file before every
/// load and pushes the local file after every save.
///
/// The local file stays authoritative: an unreachable drive degrades to
/// local-only operation with a warning instead of failing the request.
pub struct DriveSyncedStore {
    inner: TsvCatalogStore,
    drive: Arc<dyn RemoteDrive>,
}

impl DriveSyncedStore {
    pub fn new(inner: TsvCatalogStore, drive: Arc<dyn RemoteDrive>) -> Self {
        DriveSyncedStore { inner, drive }
    }
}

#[async_trait]
impl CatalogRepository for DriveSyncedStore {
    async fn load(&self) -> Result<Catalog> {
        match self.drive.download().await {
            Ok(Some(bytes)) => self.inner.write_bytes(&bytes)?,
            Ok(None) => debug!("Remote catalog file not present yet"),
            Err(err) => warn!("Catalog download failed, using local copy: {err}"),
        }
        self.inner.load().await
    }

    async fn save(&self, catalog: &Catalog) -> Result<()> {
        self.inner.save(catalog).await?;
        match self.inner.read_bytes()? {
            Some(bytes) => {
                if let Err(err) = self.drive.upload(&bytes).await {
                    warn!("Catalog upload failed, remote copy is stale: {err}");
                }
            }
            None => warn!("Catalog file vanished after save, skipping upload"),
        }
        Ok(())
    }
}
