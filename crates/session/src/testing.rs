//! In-process fake of the GraphQL API for session tests

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use credentials::CredentialStore;
use serde_json::{Value, json};
use transport::header::AUTHORIZATION;
use transport::{
    GraphqlRequest, HttpRequest, HttpResponse, StatusCode, Transport, TransportFuture,
};

use crate::{RefreshRequestBuilder, Session, SessionConfig};

const URL: &str = "http://api.test/graphql";

#[derive(Debug, Clone)]
pub struct Call {
    pub operation: String,
    pub bearer: String,
}

#[derive(Default)]
struct State {
    access: HashSet<String>,
    refresh: HashSet<String>,
    issued: u32,
    calls: Vec<Call>,
}

impl State {
    /// Keep issued numbering ahead of seeded tokens such as `R1`.
    fn seed(&mut self, token: &str) {
        let n = token
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .parse()
            .unwrap_or(0);
        self.issued = self.issued.max(n);
    }

    fn issue(&mut self) -> (String, String) {
        self.issued += 1;
        let pair = (format!("A{}", self.issued), format!("R{}", self.issued));
        self.access.insert(pair.0.clone());
        self.refresh.insert(pair.1.clone());
        pair
    }
}

/// Answers `Login`, `LoginRefresh`, `Account`, `AllShows`, `Broken` and `Crash`.
///
/// Refresh tokens rotate: a used refresh token is no longer valid.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
    always_expired: bool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_valid_access(self, token: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.seed(token);
            state.access.insert(token.to_string());
        }
        self
    }

    pub fn with_valid_refresh(self, token: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.seed(token);
            state.refresh.insert(token.to_string());
        }
        self
    }

    /// Every `Account` call reports an expired token.
    pub fn always_expired(mut self) -> Self {
        self.always_expired = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| c.operation == operation).count()
    }

    async fn handle(&self, request: HttpRequest) -> transport::Result<HttpResponse> {
        let bearer = request
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or_default()
            .to_string();
        let body: GraphqlRequest = serde_json::from_slice(&request.body)
            .map_err(|e| transport::Error::InvalidRequest(e.to_string()))?;
        let operation = body.operation_name.clone();
        self.state.lock().unwrap().calls.push(Call {
            operation: operation.clone(),
            bearer: bearer.clone(),
        });

        match operation.as_str() {
            "Login" => {
                let (access, refresh) = self.state.lock().unwrap().issue();
                Ok(HttpResponse::json_ok(&json!({
                    "data": { "login": login_payload(&access, &refresh) }
                })))
            }
            "LoginRefresh" => {
                tokio::time::sleep(Duration::from_millis(20)).await;
                let presented = body
                    .variables
                    .as_ref()
                    .and_then(|v| v["refreshToken"].as_str())
                    .unwrap_or_default()
                    .to_string();
                let issued = {
                    let mut state = self.state.lock().unwrap();
                    if state.refresh.remove(&presented) {
                        Some(state.issue())
                    } else {
                        None
                    }
                };
                match issued {
                    Some((access, refresh)) => Ok(HttpResponse::json_ok(&json!({
                        "data": { "loginRefresh": login_payload(&access, &refresh) }
                    }))),
                    None => Ok(error_response(
                        json!({ "loginRefresh": null }),
                        "Invalid refresh token",
                    )),
                }
            }
            "Account" => {
                if bearer.is_empty() {
                    return Ok(error_response(json!({ "account": null }), "Unauthorized"));
                }
                let known = self.state.lock().unwrap().access.contains(&bearer);
                if self.always_expired || !known {
                    return Ok(error_response(
                        json!({ "account": null }),
                        crate::EXPIRED_TOKEN_MESSAGE,
                    ));
                }
                Ok(HttpResponse::json_ok(&json!({
                    "data": { "account": account() }
                })))
            }
            "AllShows" => Ok(HttpResponse::json_ok(&json!({
                "data": { "allShows": [] }
            }))),
            "Broken" => Err(transport::Error::Http("connection reset".into())),
            "Crash" => Ok(HttpResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error",
            )),
            other => Ok(error_response(Value::Null, &format!("unknown operation {other}"))),
        }
    }
}

impl Transport for FakeApi {
    fn id(&self) -> &str {
        "fake-api"
    }

    fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
        Box::pin(self.handle(request))
    }
}

fn account() -> Value {
    json!({
        "id": "42",
        "username": "skipper",
        "email": "skipper@example.com",
        "role": "USER",
        "emailVerified": true
    })
}

fn login_payload(access: &str, refresh: &str) -> Value {
    json!({ "authToken": access, "refreshToken": refresh, "account": account() })
}

fn error_response(data: Value, message: &str) -> HttpResponse {
    HttpResponse::json_ok(&json!({
        "data": data,
        "errors": [{ "message": message }]
    }))
}

pub fn graphql_request(operation: &str, field: &str, variables: Option<Value>) -> HttpRequest {
    let body = GraphqlRequest {
        query: format!("query {operation} {{ {field} }}"),
        operation_name: operation.to_string(),
        variables,
    };
    HttpRequest::post_json(URL, &body).unwrap()
}

pub fn account_request() -> HttpRequest {
    graphql_request("Account", "account", None)
}

pub fn login_request() -> HttpRequest {
    graphql_request(
        "Login",
        "login",
        Some(json!({ "username": "skipper", "passwordHash": "abc" })),
    )
}

pub fn refresh_builder() -> RefreshRequestBuilder {
    Arc::new(|refresh_token: &str| {
        let body = GraphqlRequest {
            query: "mutation LoginRefresh($refreshToken: String!) { loginRefresh(refreshToken: $refreshToken) { authToken refreshToken } }".into(),
            operation_name: "LoginRefresh".into(),
            variables: Some(json!({ "refreshToken": refresh_token })),
        };
        HttpRequest::post_json(URL, &body)
    })
}

pub fn session_with(
    api: Arc<FakeApi>,
    store: Arc<dyn CredentialStore>,
    config: SessionConfig,
) -> Session {
    Session::new(api, store, refresh_builder(), config)
}
