//! Shared test infrastructure for end-to-end tests
//!
//! - `constants`: shared credentials and timeouts
//! - `fixtures`: sample records and scripted upstream fakes
//! - `server`: spawns an isolated server on a random port
//! - `client`: cookie-holding HTTP client for the API

pub mod client;
pub mod constants;
pub mod fixtures;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{png_bytes, record, sample_catalog, FakeExtractor, FakeLookup};
#[allow(unused_imports)]
pub use server::TestServer;
