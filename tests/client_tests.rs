// HTTP client tests: auth header, error normalization, 401 handling
// Author: kelexine (https://github.com/kelexine)

use fintrack::client::{ApiClient, SessionEvent, SessionState};
use fintrack::config::ApiConfig;
use fintrack::error::ApiError;
use fintrack::storage::{AuthTokens, MemoryTokenStore, TokenStore};
use mockito::Matcher;
use serde_json::{json, Value};
use std::sync::Arc;

fn api_config(base_url: String) -> ApiConfig {
    ApiConfig {
        base_url,
        timeout_seconds: 5,
        connect_timeout_seconds: 2,
    }
}

fn logged_in_store() -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_tokens(&AuthTokens::new(
        "access-abc",
        "refresh-xyz",
    )))
}

#[tokio::test]
async fn test_bearer_header_attached_when_token_stored() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/auth/user/")
        .match_header("authorization", "Bearer access-abc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 1, "username": "ada"}"#)
        .create_async()
        .await;

    let client = ApiClient::new(&api_config(server.url()), logged_in_store()).unwrap();
    assert_eq!(client.session().state(), SessionState::Authenticated);

    let user: Value = client.get("/auth/user/").await.unwrap();
    assert_eq!(user["username"], "ada");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_header_without_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/categories/")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = ApiClient::new(
        &api_config(server.url()),
        Arc::new(MemoryTokenStore::new()),
    )
    .unwrap();
    assert_eq!(client.session().state(), SessionState::Anonymous);

    let list: Vec<Value> = client.get("/categories/").await.unwrap();
    assert!(list.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_clears_tokens_and_emits_expired() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/transactions/")
        .with_status(401)
        .with_body(r#"{"detail": "Given token not valid for any token type"}"#)
        .expect(1)
        .create_async()
        .await;

    let store = logged_in_store();
    let client = ApiClient::new(&api_config(server.url()), store.clone()).unwrap();
    let mut events = client.subscribe();

    let err = client.get::<Value>("/transactions/").await.unwrap_err();

    assert!(err.is_auth_expired());
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.message(), "Given token not valid for any token type");

    assert!(store.access_token().is_none());
    assert!(store.refresh_token().is_none());
    assert_eq!(client.session().state(), SessionState::Anonymous);
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::Expired {
            path: "/transactions/".to_string()
        }
    );

    // Sent once, never retried
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_envelope_is_normalized() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/budgets/")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "message": "Budget overlaps an existing one",
                "details": {"start_date": ["overlaps"]}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let store = logged_in_store();
    let client = ApiClient::new(&api_config(server.url()), store.clone()).unwrap();

    let err = client
        .post::<_, Value>("/budgets/", &json!({"amount": 10}))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "Budget overlaps an existing one");
    assert_eq!(err.details(), Some(&json!({"start_date": ["overlaps"]})));

    // Only a 401 touches stored credentials
    assert!(store.has_tokens());
}

#[tokio::test]
async fn test_query_parameters_are_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/transactions/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("type".into(), "expense".into()),
            Matcher::UrlEncoded("search".into(), "rent & bills".into()),
        ]))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = ApiClient::new(&api_config(server.url()), logged_in_store()).unwrap();
    let query = [
        ("type", "expense".to_string()),
        ("search", "rent & bills".to_string()),
    ];
    let _: Vec<Value> = client
        .get_with_query("/transactions/", &query)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/dashboard/stats/")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = ApiClient::new(&api_config(server.url()), logged_in_store()).unwrap();
    let err = client.get::<Value>("/dashboard/stats/").await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_network_failure_has_no_status() {
    // Nothing listens on port 9 locally
    let client = ApiClient::new(
        &api_config("http://127.0.0.1:9/api".to_string()),
        logged_in_store(),
    )
    .unwrap();

    let err = client.get::<Value>("/dashboard/stats/").await.unwrap_err();

    assert!(matches!(err, ApiError::Network { .. }));
    assert_eq!(err.status(), None);
    assert!(err.details().is_none());
    assert!(client.tokens().has_tokens());
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/api/categories/4/")
        .with_status(204)
        .create_async()
        .await;

    let client = ApiClient::new(
        &api_config(format!("{}/api/", server.url())),
        logged_in_store(),
    )
    .unwrap();

    client.delete("/categories/4/").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_details_survive_without_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/transactions/")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"details": {"amount": ["This field is required."]}}"#)
        .create_async()
        .await;

    let client = ApiClient::new(&api_config(server.url()), logged_in_store()).unwrap();
    let err = client
        .post::<_, Value>("/transactions/", &json!({"type": "expense"}))
        .await
        .unwrap_err();

    assert_eq!(err.message(), "Request failed with status code 400");
    assert_eq!(
        err.details(),
        Some(&json!({"amount": ["This field is required."]}))
    );
}
