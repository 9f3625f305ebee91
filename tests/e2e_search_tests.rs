//! End-to-end tests for the search/filter endpoint.

mod common;

use common::{TestClient, TestServer, CATAN_ID, GLOOMHAVEN_ID, PANDEMIC_ID};
use reqwest::StatusCode;
use serde_json::json;

async fn search_ids(client: &TestClient, criteria: serde_json::Value) -> Vec<String> {
    let response = client.search(criteria).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    body["games"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_empty_criteria_return_everything_in_order() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let ids = search_ids(&client, json!({})).await;
    assert_eq!(ids, vec![GLOOMHAVEN_ID, CATAN_ID, PANDEMIC_ID]);
}

#[tokio::test]
async fn test_title_substring_is_case_insensitive() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let ids = search_ids(&client, json!({ "title": "cAt" })).await;
    assert_eq!(ids, vec![CATAN_ID]);
}

#[tokio::test]
async fn test_criteria_are_conjunctive() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    // both Catan and Pandemic mention "Trading"/"Cooperative"; narrow by designer
    let ids = search_ids(
        &client,
        json!({ "mechanics": "cooperative", "designer": "leacock" }),
    )
    .await;
    assert_eq!(ids, vec![PANDEMIC_ID]);
}

#[tokio::test]
async fn test_player_count_range_is_inclusive() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    // Catan supports 3-4 players
    for n in ["3", "4"] {
        let ids = search_ids(&client, json!({ "players": n })).await;
        assert!(ids.contains(&CATAN_ID.to_string()), "players={} missed", n);
    }
    let ids = search_ids(&client, json!({ "players": "5" })).await;
    assert!(!ids.contains(&CATAN_ID.to_string()));

    // 1 player: only Gloomhaven goes that low
    let ids = search_ids(&client, json!({ "players": "1" })).await;
    assert_eq!(ids, vec![GLOOMHAVEN_ID]);
}

#[tokio::test]
async fn test_non_numeric_player_input_matches_nothing() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let ids = search_ids(&client, json!({ "players": "two" })).await;
    assert!(ids.is_empty());
}

#[tokio::test]
async fn test_playtime_range_containment() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    // Pandemic is exactly 45 minutes
    let ids = search_ids(&client, json!({ "playtime": "45" })).await;
    assert_eq!(ids, vec![PANDEMIC_ID]);

    let ids = search_ids(&client, json!({ "playtime": "90" })).await;
    assert_eq!(ids, vec![GLOOMHAVEN_ID, CATAN_ID]);
}

#[tokio::test]
async fn test_weight_window_boundary() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    // Gloomhaven weighs 3.91; 3.62 is inside the +/-0.3 window, 3.60 is not
    let ids = search_ids(&client, json!({ "weight": "3.62" })).await;
    assert_eq!(ids, vec![GLOOMHAVEN_ID]);

    let ids = search_ids(&client, json!({ "weight": "3.60" })).await;
    assert!(ids.is_empty());

    let ids = search_ids(&client, json!({ "weight": "3.91" })).await;
    assert_eq!(ids, vec![GLOOMHAVEN_ID]);
}

#[tokio::test]
async fn test_expansion_flag_criterion() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let ids = search_ids(&client, json!({ "expansion": "yes" })).await;
    assert!(ids.is_empty());

    let ids = search_ids(&client, json!({ "expansion": "No" })).await;
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn test_search_with_sort_key() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let ids = search_ids(&client, json!({ "sort": "weight" })).await;
    assert_eq!(ids, vec![CATAN_ID, PANDEMIC_ID, GLOOMHAVEN_ID]);
}

#[tokio::test]
async fn test_clearing_a_search_is_just_listing_again() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let ids = search_ids(&client, json!({ "title": "catan" })).await;
    assert_eq!(ids.len(), 1);

    let response = client.list_catalog().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["total"], 3);
}
