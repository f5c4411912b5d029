//! Stateful client against a mock HTTP API

use std::sync::Arc;
use std::time::Duration;

use api_client::{ClientConfig, ClientError, LoginArgs, StatefulClient};
use credentials::{ACCESS_TOKEN_KEY, CredentialStore, MemoryStore, REFRESH_TOKEN_KEY, Role};
use serde_json::{Value, json};
use session::SessionConfig;
use transport::ReqwestTransport;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn account() -> Value {
    json!({
        "id": "42",
        "username": "skipper",
        "email": "skipper@example.com",
        "createdAt": "2024-01-01T00:00:00Z",
        "deletedAt": null,
        "emailVerified": true,
        "profileUrl": "https://example.com/skipper.png",
        "role": "USER"
    })
}

fn login_payload(access: &str, refresh: &str) -> Value {
    json!({ "authToken": access, "refreshToken": refresh, "account": account() })
}

fn client(server: &MockServer, store: Arc<MemoryStore>) -> StatefulClient {
    let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(5)).unwrap());
    StatefulClient::new(
        ClientConfig::new(server.uri(), "test-client"),
        transport,
        store,
        SessionConfig::default(),
    )
    .unwrap()
}

fn login_args() -> LoginArgs {
    LoginArgs {
        username_email: "skipper".into(),
        password_hash: "5f4dcc3b5aa765d61d8327deb882cf99".into(),
    }
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({ "operationName": "Login" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "login": login_payload("A1", "R1") }
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_persists_credentials() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let store = Arc::new(MemoryStore::new());
    let client = client(&server, store.clone());

    let data = client.login(&login_args()).await.unwrap();

    assert_eq!(data.auth_token.as_deref(), Some("A1"));
    assert!(client.is_logged_in().await.unwrap());
    assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap().as_deref(), Some("A1"));
    assert_eq!(store.get(REFRESH_TOKEN_KEY).await.unwrap().as_deref(), Some("R1"));
    let account = client.stored_account().await.unwrap().unwrap();
    assert_eq!(account.username, "skipper");
    assert_eq!(account.role, Role::User);
}

#[tokio::test]
async fn expired_token_refreshes_and_retries_transparently() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "Account" })))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "account": null },
            "errors": [{ "message": "Access token is expired" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operationName": "LoginRefresh",
            "variables": { "refreshToken": "R1" }
        })))
        .and(header("x-client-id", "test-client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "loginRefresh": login_payload("A2", "R2") }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "Account" })))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "account": account() }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = client(&server, store.clone());
    client.login(&login_args()).await.unwrap();

    let account: Value = client.account("{ id username }").await.unwrap();

    assert_eq!(account["username"], "skipper");
    assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap().as_deref(), Some("A2"));
    assert_eq!(store.get(REFRESH_TOKEN_KEY).await.unwrap().as_deref(), Some("R2"));
}

#[tokio::test]
async fn logout_stops_sending_the_old_token() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "Account" })))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "account": account() }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = client(&server, store.clone());
    client.login(&login_args()).await.unwrap();
    let _: Value = client.account("{ id }").await.unwrap();

    client.logout().await.unwrap();

    assert!(!client.is_logged_in().await.unwrap());
    assert!(store.is_empty().await);
    // Unmatched requests get wiremock's default 404
    let err = client.account::<Value>("{ id }").await.unwrap_err();
    assert!(matches!(err, ClientError::Status { .. }), "got {err:?}");
}

#[tokio::test]
async fn graphql_errors_surface_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "Login" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "login": null },
            "errors": [{ "message": "Invalid username or password" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = client(&server, store.clone());

    let err = client.login(&login_args()).await.unwrap_err();

    assert_eq!(err.messages(), ["Invalid username or password"]);
    assert!(store.is_empty().await);
}
