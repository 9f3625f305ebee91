mod file_config;

pub use file_config::{DriveConfig, ExtractorConfig, FileConfig, LookupConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub catalog_file: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            catalog_file: None,
            port: 3001,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::default(),
            frontend_dir_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub catalog_file: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub site_password_hash: String,

    // External services
    pub lookup: LookupSettings,
    pub extractor: Option<ExtractorSettings>,
    pub drive: Option<DriveSettings>,
}

#[derive(Debug, Clone)]
pub struct LookupSettings {
    pub base_url: String,
    pub timeout_sec: u64,
}

impl Default for LookupSettings {
    fn default() -> Self {
        LookupSettings {
            base_url: crate::lookup::DEFAULT_BASE_URL.to_string(),
            timeout_sec: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    pub base_url: String,
    pub model: String,
    pub fallback_model: Option<String>,
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct DriveSettings {
    pub base_url: String,
    pub file_id: String,
    pub access_token: Option<String>,
    pub timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let catalog_file = file
            .catalog_file
            .map(PathBuf::from)
            .or_else(|| cli.catalog_file.clone())
            .ok_or_else(|| {
                anyhow!("catalog_file must be specified via --catalog-file or in config file")
            })?;

        // Validate the directory the catalog file lives in
        if let Some(parent) = catalog_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Catalog file directory does not exist: {:?}", parent);
            }
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let site_password_hash = file.site_password_hash.ok_or_else(|| {
            anyhow!("site_password_hash must be set in the config file (generate one with `cli-auth hash`)")
        })?;

        let lookup_file = file.lookup.unwrap_or_default();
        let lookup_defaults = LookupSettings::default();
        let lookup = LookupSettings {
            base_url: lookup_file.base_url.unwrap_or(lookup_defaults.base_url),
            timeout_sec: lookup_file
                .timeout_sec
                .unwrap_or(lookup_defaults.timeout_sec),
        };

        let extractor = match file.extractor {
            Some(ex) => {
                let base_url = ex
                    .base_url
                    .ok_or_else(|| anyhow!("extractor.base_url is required"))?;
                let model = ex.model.ok_or_else(|| anyhow!("extractor.model is required"))?;
                if ex.api_key.is_some() && ex.api_key_command.is_some() {
                    bail!("extractor.api_key and extractor.api_key_command are mutually exclusive");
                }
                Some(ExtractorSettings {
                    base_url,
                    model,
                    fallback_model: ex.fallback_model,
                    api_key: ex.api_key,
                    api_key_command: ex.api_key_command,
                    timeout_sec: ex.timeout_sec.unwrap_or(60),
                })
            }
            None => None,
        };

        let drive = file.drive.map(|d| DriveSettings {
            base_url: d.base_url,
            file_id: d.file_id,
            access_token: d.access_token,
            timeout_sec: d.timeout_sec.unwrap_or(60),
        });

        Ok(Self {
            catalog_file,
            port,
            metrics_port,
            logging_level,
            frontend_dir_path,
            site_password_hash,
            lookup,
            extractor,
            drive,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
