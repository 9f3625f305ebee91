use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub catalog_file: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,

    /// PHC hash of the shared site password; generate with `cli-auth hash`.
    pub site_password_hash: Option<String>,

    // Feature configs
    pub lookup: Option<LookupConfig>,
    pub extractor: Option<ExtractorConfig>,
    pub drive: Option<DriveConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: Option<String>,
    pub timeout_sec: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ExtractorConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    /// Model variant retried once when the primary model fails.
    pub fallback_model: Option<String>,
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub timeout_sec: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DriveConfig {
    pub base_url: String,
    pub file_id: String,
    pub access_token: Option<String>,
    pub timeout_sec: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
