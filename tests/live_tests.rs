//! Smoke tests against a running server started with demo data (`seed.enabled = true`)

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8000";

/// Helper to get a token for a seeded account
async fn get_auth_token(client: &Client, email: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "123456789"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["accessToken"].as_str().expect("No token in response").to_string()
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
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@example.com",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_search_seeded_catalog() {
    let client = Client::new();

    let response = client
        .get(format!("{}/auth/books?title=Book%201", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let books = body.as_array().expect("Expected an array");
    assert!(books.iter().any(|b| b["status"] == "borrowed"));
}

#[tokio::test]
#[ignore]
async fn test_most_borrowed() {
    let client = Client::new();

    let response = client
        .get(format!("{}/auth/books/most-borrowed", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["popular"].as_i64().unwrap_or(0) >= 1);
}

#[tokio::test]
#[ignore]
async fn test_reader_cannot_manage_books() {
    let client = Client::new();
    let token = get_auth_token(&client, "user1@example.com").await;

    let response = client
        .post(format!("{}/admin/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Forbidden",
            "detail": "Should not be created",
            "author": "Nobody",
            "category": "Fiction"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_admin_cannot_delete_borrowed_book() {
    let client = Client::new();
    let token = get_auth_token(&client, "admin@example.com").await;

    // book 1 is lent to user1 by the demo data
    let response = client
        .delete(format!("{}/admin/books/1", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}
