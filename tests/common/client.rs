//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all meepledex-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing authentication flows.
    /// For most tests, use `authenticated()` instead.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Automatically handle session cookies
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client pre-authenticated with the shared site password
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String) -> Self {
        let client = Self::new(base_url);

        let response = client.login(SITE_PASSWORD).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Site authentication failed: {:?}",
            response.text().await
        );

        client
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /v1/auth/login
    pub async fn login(&self, password: &str) -> Response {
        self.client
            .post(format!("{}/v1/auth/login", self.base_url))
            .json(&json!({ "password": password }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// GET /v1/auth/logout
    pub async fn logout(&self) -> Response {
        self.client
            .get(format!("{}/v1/auth/logout", self.base_url))
            .send()
            .await
            .expect("Logout request failed")
    }

    // ========================================================================
    // Catalog Endpoints
    // ========================================================================

    /// GET /v1/catalog
    pub async fn list_catalog(&self) -> Response {
        self.client
            .get(format!("{}/v1/catalog", self.base_url))
            .send()
            .await
            .expect("List catalog request failed")
    }

    /// GET /v1/catalog?sort={key}
    pub async fn list_catalog_sorted(&self, sort: &str) -> Response {
        self.client
            .get(format!("{}/v1/catalog?sort={}", self.base_url, sort))
            .send()
            .await
            .expect("List catalog sorted request failed")
    }

    /// POST /v1/catalog/search
    pub async fn search(&self, criteria: serde_json::Value) -> Response {
        self.client
            .post(format!("{}/v1/catalog/search", self.base_url))
            .json(&criteria)
            .send()
            .await
            .expect("Search request failed")
    }

    /// POST /v1/catalog/games
    pub async fn add_by_title(&self, title: &str) -> Response {
        self.client
            .post(format!("{}/v1/catalog/games", self.base_url))
            .json(&json!({ "title": title }))
            .send()
            .await
            .expect("Add by title request failed")
    }

    /// PUT /v1/catalog/games/{id}
    pub async fn edit_game(&self, id: &str, patch: serde_json::Value) -> Response {
        self.client
            .put(format!("{}/v1/catalog/games/{}", self.base_url, id))
            .json(&patch)
            .send()
            .await
            .expect("Edit game request failed")
    }

    /// DELETE /v1/catalog/games/{id}
    pub async fn delete_game(&self, id: &str) -> Response {
        self.client
            .delete(format!("{}/v1/catalog/games/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete game request failed")
    }

    /// POST /v1/catalog/search-by-image
    pub async fn search_by_image(&self, image: Vec<u8>) -> Response {
        let part = reqwest::multipart::Part::bytes(image).file_name("shelf.png");
        let form = reqwest::multipart::Form::new().part("image", part);
        self.client
            .post(format!("{}/v1/catalog/search-by-image", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("Search by image request failed")
    }

    // ========================================================================
    // Wizard Endpoints
    // ========================================================================

    /// POST /v1/wizard/image
    pub async fn upload_image(&self, image: Vec<u8>) -> Response {
        let part = reqwest::multipart::Part::bytes(image).file_name("shelf.png");
        let form = reqwest::multipart::Form::new().part("image", part);
        self.client
            .post(format!("{}/v1/wizard/image", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("Upload image request failed")
    }

    /// GET /v1/wizard
    pub async fn wizard_status(&self) -> Response {
        self.client
            .get(format!("{}/v1/wizard", self.base_url))
            .send()
            .await
            .expect("Wizard status request failed")
    }

    /// POST /v1/wizard/choice
    pub async fn wizard_choice(&self, candidate_id: &str) -> Response {
        self.client
            .post(format!("{}/v1/wizard/choice", self.base_url))
            .json(&json!({ "candidate_id": candidate_id }))
            .send()
            .await
            .expect("Wizard choice request failed")
    }

    /// POST /v1/wizard/commit
    pub async fn wizard_commit(&self) -> Response {
        self.client
            .post(format!("{}/v1/wizard/commit", self.base_url))
            .send()
            .await
            .expect("Wizard commit request failed")
    }

    /// DELETE /v1/wizard
    pub async fn wizard_cancel(&self) -> Response {
        self.client
            .delete(format!("{}/v1/wizard", self.base_url))
            .send()
            .await
            .expect("Wizard cancel request failed")
    }

    // ========================================================================
    // Health Check / System Endpoints
    // ========================================================================

    /// GET /
    pub async fn get_stats(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Get stats request failed")
    }
}
