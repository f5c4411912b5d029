//! Payload shapes returned by credential-bearing operations

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of `login`, `loginRefresh`, `createAccount`, `changePassword` and
/// `resetPassword`.
///
/// Every field is optional because the caller picks the selection set; a
/// stateless caller asking for `{ authToken }` gets only that field back.
/// `account` is kept as raw JSON so any sub-selection round-trips into storage.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<serde_json::Value>,
}

impl LoginData {
    /// Full triple with tokens and an optional account snapshot.
    pub fn new(
        auth_token: impl Into<String>,
        refresh_token: impl Into<String>,
        account: Option<serde_json::Value>,
    ) -> Self {
        Self {
            auth_token: Some(auth_token.into()),
            refresh_token: Some(refresh_token.into()),
            account,
        }
    }

    /// The empty triple, i.e. logged out.
    pub fn empty() -> Self {
        Self::default()
    }
}

// Tokens must not leak through `{:?}` in log lines.
impl fmt::Debug for LoginData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |t: &Option<String>| t.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("LoginData")
            .field("auth_token", &redact(&self.auth_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("account", &self.account.is_some())
            .finish()
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Dev,
    Admin,
    User,
}

/// Account snapshot as selected by the stateful client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
    #[serde(default)]
    pub deleted_at: Option<String>,
    pub email_verified: bool,
    pub profile_url: String,
    pub role: Role,
}
