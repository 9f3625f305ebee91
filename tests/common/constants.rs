//! Shared constants for end-to-end tests

/// The shared site password every test server is provisioned with
pub const SITE_PASSWORD: &str = "test-site-password";

/// Timeout for individual HTTP requests
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// How long to wait for a spawned server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Poll interval while waiting for readiness
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 25;

// Seeded catalog records (see fixtures::sample_catalog)
pub const GLOOMHAVEN_ID: &str = "174430";
pub const CATAN_ID: &str = "13";
pub const PANDEMIC_ID: &str = "30549";
