//! Command-line commands and their execution against a `StatefulClient`

use anyhow::{Context, Result, anyhow, bail};
use api_client::{LoginArgs, StatefulClient, find_operation};
use common::Secret;
use md5::{Digest, Md5};
use serde_json::{Value, json};

pub const USAGE: &str = "usage: api-cli [--config PATH] <command>

commands:
  login <username-or-email> <password>
  logout
  whoami
  health
  query <operation> <selection> [json-variables]";

/// Fields shown by `whoami`.
const WHOAMI_SELECTION: &str = "{ id username email role emailVerified }";

#[derive(Debug)]
pub enum Command {
    Login {
        username_email: String,
        password: Secret<String>,
    },
    Logout,
    Whoami,
    Health,
    Query {
        operation: String,
        selection: String,
        variables: Option<Value>,
    },
}

impl Command {
    /// Parse positional arguments (program name and `--config` already removed).
    pub fn parse(args: &[String]) -> Result<Self> {
        let (name, rest) = args.split_first().ok_or_else(|| anyhow!("missing command"))?;
        match (name.as_str(), rest) {
            ("login", [username_email, password]) => Ok(Command::Login {
                username_email: username_email.clone(),
                password: Secret::new(password.clone()),
            }),
            ("logout", []) => Ok(Command::Logout),
            ("whoami", []) => Ok(Command::Whoami),
            ("health", []) => Ok(Command::Health),
            ("query", [operation, selection, variables @ ..]) if variables.len() <= 1 => {
                let variables = variables
                    .first()
                    .map(|raw| serde_json::from_str(raw).context("variables must be valid JSON"))
                    .transpose()?;
                Ok(Command::Query {
                    operation: operation.clone(),
                    selection: selection.clone(),
                    variables,
                })
            }
            (other, _) => bail!("unrecognized command or arguments: {other}"),
        }
    }
}

/// The API expects the md5 hex digest of the password, never the password.
pub fn password_hash(password: &str) -> String {
    hex::encode(Md5::digest(password.as_bytes()))
}

/// Run `command`, returning the JSON document to print.
pub async fn run(client: &StatefulClient, command: Command) -> Result<Value> {
    match command {
        Command::Login {
            username_email,
            password,
        } => {
            let args = LoginArgs {
                username_email,
                password_hash: password_hash(password.expose()),
            };
            let data = client.login(&args).await.context("login failed")?;
            Ok(json!({ "loggedIn": true, "account": data.account }))
        }
        Command::Logout => {
            client.logout().await.context("failed to clear credentials")?;
            Ok(json!({ "loggedIn": false }))
        }
        Command::Whoami => {
            if !client.is_logged_in().await? {
                return Ok(json!({ "loggedIn": false }));
            }
            let stored = client.stored_account().await?;
            let current: Value = client
                .account(WHOAMI_SELECTION)
                .await
                .context("account query failed")?;
            Ok(json!({ "loggedIn": true, "stored": stored, "account": current }))
        }
        Command::Health => {
            let health = client.health_check().await.context("health check failed")?;
            Ok(serde_json::to_value(health)?)
        }
        Command::Query {
            operation,
            selection,
            variables,
        } => {
            let op = find_operation(&operation)
                .ok_or_else(|| anyhow!("unknown operation: {operation}"))?;
            let result: Value = client
                .execute(op, &selection, variables)
                .await
                .with_context(|| format!("{operation} failed"))?;
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::ClientConfig;
    use credentials::FileStore;
    use session::SessionConfig;
    use std::sync::Arc;
    use std::time::Duration;
    use transport::ReqwestTransport;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn md5_hex_digest() {
        assert_eq!(password_hash("password"), "5f4dcc3b5aa765d61d8327deb882cf99");
    }

    #[test]
    fn parse_login() {
        let command = Command::parse(&args(&["login", "skipper", "hunter2"])).unwrap();
        match command {
            Command::Login {
                username_email,
                password,
            } => {
                assert_eq!(username_email, "skipper");
                assert_eq!(password.expose(), "hunter2");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn password_not_in_debug_output() {
        let command = Command::parse(&args(&["login", "skipper", "hunter2"])).unwrap();
        assert!(!format!("{command:?}").contains("hunter2"));
    }

    #[test]
    fn parse_query_with_variables() {
        let command = Command::parse(&args(&[
            "query",
            "findShow",
            "{ id name }",
            r#"{"showId":"7"}"#,
        ]))
        .unwrap();
        match command {
            Command::Query {
                operation,
                variables,
                ..
            } => {
                assert_eq!(operation, "findShow");
                assert_eq!(variables.unwrap()["showId"], "7");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(Command::parse(&[]).is_err());
        assert!(Command::parse(&args(&["login", "only-user"])).is_err());
        assert!(Command::parse(&args(&["query", "account", "{ id }", "not json"])).is_err());
        assert!(Command::parse(&args(&["dance"])).is_err());
    }

    #[tokio::test]
    async fn login_then_whoami_survives_restart() {
        let server = MockServer::start().await;
        let account = json!({
            "id": "42",
            "username": "skipper",
            "email": "skipper@example.com",
            "createdAt": "2024-01-01T00:00:00Z",
            "deletedAt": null,
            "emailVerified": true,
            "profileUrl": "https://example.com/skipper.png",
            "role": "USER"
        });
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({
                "operationName": "Login",
                "variables": { "passwordHash": "5f4dcc3b5aa765d61d8327deb882cf99" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "login": {
                    "authToken": "A1", "refreshToken": "R1", "account": account.clone()
                } }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "operationName": "Account" })))
            .and(header("authorization", "Bearer A1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "account": account }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let creds = dir.path().join("creds.json");
        let build = |store: FileStore| {
            StatefulClient::new(
                ClientConfig::new(server.uri(), "cli-test"),
                Arc::new(ReqwestTransport::new(Duration::from_secs(5)).unwrap()),
                Arc::new(store),
                SessionConfig::default(),
            )
            .unwrap()
        };

        let client = build(FileStore::load(creds.clone()).await.unwrap());
        let login = Command::parse(&args(&["login", "skipper", "password"])).unwrap();
        let out = run(&client, login).await.unwrap();
        assert_eq!(out["loggedIn"], true);
        drop(client);

        // A new process reads the same file
        let client = build(FileStore::load(creds).await.unwrap());
        let out = run(&client, Command::Whoami).await.unwrap();
        assert_eq!(out["loggedIn"], true);
        assert_eq!(out["stored"]["username"], "skipper");
        assert_eq!(out["account"]["id"], "42");
    }

    #[tokio::test]
    async fn unknown_operation_is_rejected_before_sending() {
        let server = MockServer::start().await;
        let client = StatefulClient::new(
            ClientConfig::new(server.uri(), "cli-test"),
            Arc::new(ReqwestTransport::new(Duration::from_secs(5)).unwrap()),
            Arc::new(credentials::MemoryStore::new()),
            SessionConfig::default(),
        )
        .unwrap();

        let command = Command::Query {
            operation: "dropTables".into(),
            selection: "{ id }".into(),
            variables: None,
        };
        let err = run(&client, command).await.unwrap_err();
        assert!(err.to_string().contains("unknown operation"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
