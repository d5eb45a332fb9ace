//! API integration tests
//!
//! These run against a live server backed by a hosted auth project. The
//! admin account is read from SITESTOCK_TEST_ADMIN_EMAIL and
//! SITESTOCK_TEST_ADMIN_PASSWORD.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn admin_credentials() -> (String, String) {
    (
        std::env::var("SITESTOCK_TEST_ADMIN_EMAIL").unwrap_or_else(|_| "admin@sitestock.local".to_string()),
        std::env::var("SITESTOCK_TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "admin-password".to_string()),
    )
}

/// Helper to get an admin access token
async fn get_admin_token(client: &Client) -> String {
    let (email, password) = admin_credentials();
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["access_token"]
        .as_str()
        .expect("No access token in response")
        .to_string()
}

async fn create_site(client: &Client, token: &str, name: &str) -> i64 {
    let response = client
        .post(format!("{}/sites", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "site_name": name, "contractor": "Integration Co" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No site id")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_login_returns_role() {
    let client = Client::new();
    let (email, password) = admin_credentials();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access_token"].is_string());
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let (email, _) = admin_credentials();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "definitely-wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/sites", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{}/sites", BASE_URL))
        .bearer_auth("not-a-token")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_admin_cannot_open_supervisor_dashboard() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .get(format!("{}/dashboard", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_group_edit_redistributes_quantity() {
    let client = Client::new();
    let token = get_admin_token(&client).await;
    let site_id = create_site(&client, &token, "Group Edit Site").await;

    let mut ids = Vec::new();
    for quantity in [1, 1, 1] {
        let response = client
            .post(format!("{}/equipment", BASE_URL))
            .bearer_auth(&token)
            .json(&json!({ "name": "Shovel", "site_id": site_id, "quantity": quantity }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.expect("Failed to parse response");
        ids.push(body["id"].as_i64().expect("No equipment id"));
    }

    let response = client
        .put(format!("{}/equipment/group", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "ids": ids, "quantity": 10, "site_id": site_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let rows: Vec<Value> = response.json().await.expect("Failed to parse response");
    let quantities: Vec<i64> = rows.iter().map(|r| r["quantity"].as_i64().unwrap()).collect();
    assert_eq!(quantities, vec![4, 3, 3]);

    let response = client
        .post(format!("{}/equipment/group/delete", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "ids": ids }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["deleted"], 3);

    let response = client
        .delete(format!("{}/sites/{}", BASE_URL, site_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_delete_site_with_equipment_conflicts() {
    let client = Client::new();
    let token = get_admin_token(&client).await;
    let site_id = create_site(&client, &token, "Occupied Site").await;

    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": "Mixer", "site_id": site_id, "quantity": 2 }))
        .send()
        .await
        .expect("Failed to send request");
    let equipment: Value = response.json().await.expect("Failed to parse response");

    let response = client
        .delete(format!("{}/sites/{}", BASE_URL, site_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    client
        .delete(format!("{}/equipment/{}", BASE_URL, equipment["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    client
        .delete(format!("{}/sites/{}", BASE_URL, site_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
}

#[tokio::test]
#[ignore]
async fn test_admin_cannot_create_requests() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "request_type": "buy", "equipment_name": "Drill", "quantity": 1 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_stats() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["admins"].as_i64().unwrap_or(0) >= 1);
    assert!(body["pending_requests"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_transaction_log_lists_pending_first() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .get(format!("{}/transfers", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let transfers: Vec<Value> = response.json().await.expect("Failed to parse response");
    let first_decided = transfers
        .iter()
        .position(|t| t["status"] != "pending")
        .unwrap_or(transfers.len());
    assert!(transfers[first_decided..].iter().all(|t| t["status"] != "pending"));
}
