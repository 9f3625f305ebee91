//! File-backed catalog store.

use super::CatalogRepository;
use crate::catalog::{tsv, Catalog};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Catalog store backed by a local TSV file.
///
/// Saves go through a temp file in the same directory followed by an atomic
/// rename, so the catalog file is never left partially written.
pub struct TsvCatalogStore {
    path: PathBuf,
}

impl TsvCatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TsvCatalogStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file contents, for uploading to a remote drive.
    pub fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        std::fs::read(&self.path)
            .with_context(|| format!("Failed to read catalog file {:?}", self.path))
            .map(Some)
    }

    /// Atomically replace the file contents, e.g. with a downloaded remote copy.
    pub fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
        tmp.write_all(bytes)
            .context("Failed to write catalog temp file")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace catalog file {:?}", self.path))?;
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for TsvCatalogStore {
    async fn load(&self) -> Result<Catalog> {
        if !self.path.exists() {
            return Ok(Catalog::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read catalog file {:?}", self.path))?;
        tsv::parse(&content)
    }

    async fn save(&self, catalog: &Catalog) -> Result<()> {
        let bytes = tsv::serialize(catalog)?;
        self.write_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GameRecord;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_loads_as_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let store = TsvCatalogStore::new(dir.path().join("boardgames.tsv"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = TsvCatalogStore::new(dir.path().join("boardgames.tsv"));

        let catalog = Catalog::new(vec![GameRecord {
            id: "13".to_string(),
            title: "Catan".to_string(),
            min_players: Some(3),
            max_players: Some(4),
            weight: Some(2.29),
            ..Default::default()
        }]);
        store.save(&catalog).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.games(), catalog.games());
    }

    #[tokio::test]
    async fn save_replaces_previous_contents_wholesale() {
        let dir = TempDir::new().unwrap();
        let store = TsvCatalogStore::new(dir.path().join("boardgames.tsv"));

        let first = Catalog::new(vec![GameRecord {
            id: "1".to_string(),
            title: "Azul".to_string(),
            ..Default::default()
        }]);
        store.save(&first).await.unwrap();

        let second = Catalog::new(vec![GameRecord {
            id: "2".to_string(),
            title: "Wingspan".to_string(),
            ..Default::default()
        }]);
        store.save(&second).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.games()[0].title, "Wingspan");
    }
}
