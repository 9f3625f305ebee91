//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own in-memory catalog and
//! scripted upstream fakes.

use super::constants::*;
use super::fixtures::{FakeExtractor, FakeLookup};
use meepledex::auth::SiteHasher;
use meepledex::catalog::Catalog;
use meepledex::catalog_store::{CatalogRepository, InMemoryCatalogStore};
use meepledex::extractor::TitleExtractor;
use meepledex::lookup::GameLookup;
use meepledex::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Test server instance with an isolated in-memory catalog
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Catalog store for direct state assertions in tests
    pub store: Arc<InMemoryCatalogStore>,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server with the default sample catalog and no upstreams.
    pub async fn spawn() -> Self {
        Self::spawn_with(
            super::fixtures::sample_catalog(),
            FakeLookup::new(),
            None,
        )
        .await
    }

    /// Spawns a server with the given catalog and scripted upstreams.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be built, bound, or does not become
    /// ready within the timeout.
    pub async fn spawn_with(
        catalog: Catalog,
        lookup: FakeLookup,
        extractor: Option<FakeExtractor>,
    ) -> Self {
        let store = Arc::new(InMemoryCatalogStore::new(catalog));
        let lookup: Arc<dyn GameLookup> = Arc::new(lookup);
        let extractor: Option<Arc<dyn TitleExtractor>> =
            extractor.map(|e| Arc::new(e) as Arc<dyn TitleExtractor>);

        let hasher = SiteHasher::Argon2;
        let salt = hasher.generate_b64_salt();
        let site_password_hash = hasher
            .hash(SITE_PASSWORD.as_bytes(), &salt)
            .expect("Failed to hash test password");

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port,
            frontend_dir_path: None,
            site_password_hash,
        };

        let app = make_app(
            config,
            store.clone() as Arc<dyn CatalogRepository>,
            lookup,
            extractor,
        )
        .expect("Failed to build app");

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// The currently persisted catalog.
    pub fn catalog(&self) -> Catalog {
        self.store.snapshot()
    }

    /// Waits for the server to become ready by polling the stats endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
