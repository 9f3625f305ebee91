//! In-memory catalog store for tests.

use super::CatalogRepository;
use crate::catalog::Catalog;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// Keeps the catalog in memory while honoring the reload/rewrite contract.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    catalog: Mutex<Catalog>,
}

impl InMemoryCatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        InMemoryCatalogStore {
            catalog: Mutex::new(catalog),
        }
    }

    /// Direct snapshot for asserting on persisted state in tests.
    pub fn snapshot(&self) -> Catalog {
        self.catalog.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogStore {
    async fn load(&self) -> Result<Catalog> {
        Ok(self.catalog.lock().unwrap().clone())
    }

    async fn save(&self, catalog: &Catalog) -> Result<()> {
        *self.catalog.lock().unwrap() = catalog.clone();
        Ok(())
    }
}
