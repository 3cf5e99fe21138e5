//! Integration tests for the auth endpoints against a mock server.

use codeep_rs::{CodeepClient, Error};
use mockito::{Matcher, Server};
use serde_json::json;

fn user_json() -> serde_json::Value {
    json!({
        "id": 1,
        "username": "testuser",
        "email": "test@example.com",
        "api_key": "ck_live_abc123",
        "daily_limit": 100,
        "created_at": "2024-05-01T10:00:00Z"
    })
}

#[tokio::test]
async fn test_register_sends_credentials_and_returns_user() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/register")
        .match_body(Matcher::Json(json!({
            "username": "testuser",
            "email": "test@example.com",
            "password": "hunter2",
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "message": "User registered successfully",
                "user": user_json(),
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = CodeepClient::with_base_url(&server.url()).unwrap();
    let response = client
        .register("testuser", "test@example.com", "hunter2")
        .await
        .unwrap();

    assert_eq!(response.user.username, "testuser");
    assert_eq!(response.user.daily_limit, 100);
    assert_eq!(
        response.message.as_deref(),
        Some("User registered successfully")
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_register_rejects_blank_username_locally() {
    let server = Server::new_async().await;
    let client = CodeepClient::with_base_url(&server.url()).unwrap();

    let err = client
        .register("   ", "test@example.com", "hunter2")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_login_stores_token_for_subsequent_requests() {
    let mut server = Server::new_async().await;
    let login_mock = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::Json(json!({
            "username": "testuser",
            "password": "hunter2",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "tok_abc123",
                "user": user_json(),
            })
            .to_string(),
        )
        .create_async()
        .await;
    let me_mock = server
        .mock("GET", "/auth/me")
        .match_header("authorization", "Bearer tok_abc123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"user": user_json()}).to_string())
        .create_async()
        .await;

    let client = CodeepClient::with_base_url(&server.url()).unwrap();
    let login = client.login("testuser", "hunter2").await.unwrap();
    assert_eq!(login.access_token, "tok_abc123");

    let user = client.get_current_user().await.unwrap();
    assert_eq!(user.email, "test@example.com");

    login_mock.assert_async().await;
    me_mock.assert_async().await;
}

#[tokio::test]
async fn test_clear_token_returns_session_to_anonymous() {
    let mut server = Server::new_async().await;
    let _login_mock = server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "tok_abc123",
                "user": user_json(),
            })
            .to_string(),
        )
        .create_async()
        .await;
    let anonymous_mock = server
        .mock("GET", "/auth/me")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": "Missing authorization header"}).to_string())
        .create_async()
        .await;

    let client = CodeepClient::with_base_url(&server.url()).unwrap();
    client.login("testuser", "hunter2").await.unwrap();
    client.clear_token();

    let err = client.get_current_user().await.unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
    assert!(err.to_string().contains("Missing authorization header"));
    anonymous_mock.assert_async().await;
}

#[tokio::test]
async fn test_manually_set_token_is_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/auth/me")
        .match_header("authorization", "Bearer tok_restored")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"user": user_json()}).to_string())
        .create_async()
        .await;

    let client = CodeepClient::with_base_url(&server.url()).unwrap();
    client.set_token("tok_restored");
    client.get_current_user().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_credentials_map_to_authentication_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": "Invalid username or password"}).to_string())
        .create_async()
        .await;

    let client = CodeepClient::with_base_url(&server.url()).unwrap();
    let err = client.login("testuser", "wrong").await.unwrap_err();

    assert!(matches!(err, Error::Authentication(_)));
    assert_eq!(err.status_code(), Some(401));
    assert!(err.to_string().contains("Invalid username or password"));
}

#[tokio::test]
async fn test_forbidden_maps_to_authorization_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/auth/me")
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": "Account suspended"}).to_string())
        .create_async()
        .await;

    let client = CodeepClient::with_base_url(&server.url()).unwrap();
    let err = client.get_current_user().await.unwrap_err();

    assert!(matches!(err, Error::Authorization(_)));
    assert_eq!(err.status_code(), Some(403));
}

#[tokio::test]
async fn test_get_quota_parses_counters() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/auth/quota")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "daily_limit": 100,
                "used_today": 25,
                "remaining": 75,
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = CodeepClient::with_base_url(&server.url()).unwrap();
    let quota = client.get_quota().await.unwrap();
    assert_eq!(quota.daily_limit, 100);
    assert_eq!(quota.used_today, 25);
    assert_eq!(quota.remaining, 75);
}

#[tokio::test]
async fn test_get_quota_exhausted_maps_to_quota_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/auth/quota")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": "Daily quota exceeded"}).to_string())
        .create_async()
        .await;

    let client = CodeepClient::with_base_url(&server.url()).unwrap();
    let err = client.get_quota().await.unwrap_err();

    assert!(matches!(err, Error::QuotaExceeded(_)));
    assert_eq!(err.status_code(), Some(429));
    assert!(err.to_string().contains("Daily quota exceeded"));
}

#[tokio::test]
async fn test_validate_quota_exhaustion_is_a_normal_return() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/auth/quota/validate")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "message": "Daily quota exceeded",
                "remaining": 0,
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = CodeepClient::with_base_url(&server.url()).unwrap();
    let validation = client.validate_quota().await.unwrap();

    assert!(validation.exceeded);
    assert_eq!(validation.remaining, Some(0));
    assert_eq!(validation.message.as_deref(), Some("Daily quota exceeded"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_validate_quota_with_headroom() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/auth/quota/validate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"remaining": 42}).to_string())
        .create_async()
        .await;

    let client = CodeepClient::with_base_url(&server.url()).unwrap();
    let validation = client.validate_quota().await.unwrap();

    assert!(!validation.exceeded);
    assert_eq!(validation.remaining, Some(42));
}

#[tokio::test]
async fn test_validate_quota_other_errors_still_raise() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/auth/quota/validate")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": "Token expired"}).to_string())
        .create_async()
        .await;

    let client = CodeepClient::with_base_url(&server.url()).unwrap();
    let err = client.validate_quota().await.unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
}

#[tokio::test]
async fn test_server_error_carries_status_and_details() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/auth/me")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": "boom", "trace_id": "t-1"}).to_string())
        .create_async()
        .await;

    let client = CodeepClient::with_base_url(&server.url()).unwrap();
    let err = client.get_current_user().await.unwrap_err();

    match &err {
        Error::Api { status, message, details } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "boom");
            assert_eq!(
                details.as_ref().and_then(|d| d.get("trace_id")),
                Some(&json!("t-1"))
            );
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(err.status_code(), Some(500));
}
