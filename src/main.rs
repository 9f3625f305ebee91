use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod auth;
mod catalog;

mod catalog_store;
use catalog_store::{CatalogRepository, DriveSyncedStore, TsvCatalogStore};

mod config;
use config::{AppConfig, CliConfig, FileConfig};

mod drive;
use drive::HttpRemoteDrive;

mod extractor;
use extractor::{ApiKeySource, OpenAiVisionExtractor, TitleExtractor};

mod lookup;
use lookup::{BggClient, GameLookup};

mod search;

mod server;
use server::{run_server, RequestsLoggingLevel, ServerConfig};

mod wizard;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the TOML config file.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the catalog TSV file.
    #[clap(long, value_parser = parse_path)]
    pub catalog_file: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        catalog_file: cli_args.catalog_file,
        port: cli_args.port,
        metrics_port: cli_args.metrics_port,
        logging_level: cli_args.logging_level,
        frontend_dir_path: cli_args.frontend_dir_path,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Initializing metrics...");
    server::metrics::init_metrics();

    info!("Opening catalog at {:?}...", config.catalog_file);
    let tsv_store = TsvCatalogStore::new(&config.catalog_file);
    let repository: Arc<dyn CatalogRepository> = match &config.drive {
        Some(drive) => {
            info!("Drive sync enabled against {}", drive.base_url);
            let client = HttpRemoteDrive::new(
                drive.base_url.clone(),
                drive.file_id.clone(),
                drive.access_token.clone(),
                drive.timeout_sec,
            );
            Arc::new(DriveSyncedStore::new(tsv_store, Arc::new(client)))
        }
        None => Arc::new(tsv_store),
    };

    let catalog = repository
        .load()
        .await
        .context("Failed to load the catalog")?;
    server::metrics::set_catalog_size(catalog.len());
    info!("Catalog holds {} games", catalog.len());

    let lookup: Arc<dyn GameLookup> = Arc::new(BggClient::new(
        config.lookup.base_url.clone(),
        config.lookup.timeout_sec,
    ));
    info!("Game lookup configured at {}", config.lookup.base_url);

    let extractor: Option<Arc<dyn TitleExtractor>> = config.extractor.as_ref().map(|ex| {
        info!("Title extractor configured: model {}", ex.model);
        let api_key_source = match (&ex.api_key, &ex.api_key_command) {
            (Some(key), _) => ApiKeySource::Static(key.clone()),
            (None, Some(cmd)) => ApiKeySource::Command(cmd.clone()),
            (None, None) => ApiKeySource::None,
        };
        Arc::new(OpenAiVisionExtractor::new(
            ex.base_url.clone(),
            ex.model.clone(),
            ex.fallback_model.clone(),
            api_key_source,
            ex.timeout_sec,
        )) as Arc<dyn TitleExtractor>
    });
    if extractor.is_none() {
        info!("No title extractor configured, image flows will be disabled");
    }

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level.clone(),
        port: config.port,
        frontend_dir_path: config.frontend_dir_path.clone(),
        site_password_hash: config.site_password_hash.clone(),
    };

    info!("Ready to serve at port {}!", config.port);
    info!("Metrics available at port {}!", config.metrics_port);
    run_server(
        server_config,
        repository,
        lookup,
        extractor,
        config.metrics_port,
    )
    .await
}
