//! Response inspection: expiry detection and credential discovery
//!
//! The API reports an expired access token as a GraphQL error with HTTP 200,
//! not as a 401, so expiry is detected from the decoded body.

use credentials::LoginData;
use tracing::debug;
use transport::{GraphqlError, StatusCode};

/// Message the server uses for an expired access token.
pub const EXPIRED_TOKEN_MESSAGE: &str = "Access token is expired";

/// Operations whose payload is `{ authToken, refreshToken, account }`.
pub const AUTH_OPERATIONS: &[&str] = &[
    "login",
    "loginRefresh",
    "createAccount",
    "changePassword",
    "resetPassword",
];

/// Whether a transported response signals an expired access token.
///
/// Only a 200 response counts; other statuses are transport-level outcomes the
/// caller handles.
pub fn is_access_token_expired(status: StatusCode, errors: &[GraphqlError]) -> bool {
    status == StatusCode::OK && errors.iter().any(|e| e.message == EXPIRED_TOKEN_MESSAGE)
}

/// Find a login payload in a response's `data` object.
///
/// Returns the operation name and the decoded payload. A `null` payload (the
/// operation failed) or one that is not an object is skipped.
pub fn find_login_data(data: &serde_json::Value) -> Option<(&'static str, LoginData)> {
    let fields = data.as_object()?;
    AUTH_OPERATIONS.iter().find_map(|&operation| {
        let payload = fields.get(operation)?;
        if payload.is_null() {
            return None;
        }
        match serde_json::from_value::<LoginData>(payload.clone()) {
            Ok(login) => Some((operation, login)),
            Err(e) => {
                debug!(operation, error = %e, "ignoring non-login payload");
                None
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expired_on_200_with_matching_message() {
        let errors = vec![GraphqlError::new(EXPIRED_TOKEN_MESSAGE)];
        assert!(is_access_token_expired(StatusCode::OK, &errors));
    }

    #[test]
    fn expired_among_other_errors() {
        let errors = vec![
            GraphqlError::new("Show not found"),
            GraphqlError::new(EXPIRED_TOKEN_MESSAGE),
        ];
        assert!(is_access_token_expired(StatusCode::OK, &errors));
    }

    #[test]
    fn not_expired_on_other_status() {
        let errors = vec![GraphqlError::new(EXPIRED_TOKEN_MESSAGE)];
        assert!(!is_access_token_expired(StatusCode::UNAUTHORIZED, &errors));
        assert!(!is_access_token_expired(StatusCode::INTERNAL_SERVER_ERROR, &errors));
    }

    #[test]
    fn not_expired_on_similar_message() {
        let errors = vec![GraphqlError::new("access token is expired")];
        assert!(!is_access_token_expired(StatusCode::OK, &errors));
        assert!(!is_access_token_expired(StatusCode::OK, &[]));
    }

    #[test]
    fn finds_login_payload() {
        let data = json!({"login": {"authToken": "A1", "refreshToken": "R1"}});
        let (operation, login) = find_login_data(&data).unwrap();
        assert_eq!(operation, "login");
        assert_eq!(login.auth_token.as_deref(), Some("A1"));
        assert_eq!(login.refresh_token.as_deref(), Some("R1"));
    }

    #[test]
    fn finds_every_auth_operation() {
        for op in AUTH_OPERATIONS {
            let data = json!({ op.to_string(): {"authToken": "A", "refreshToken": "R"} });
            assert_eq!(find_login_data(&data).map(|(name, _)| name), Some(*op));
        }
    }

    #[test]
    fn ignores_null_and_unrelated_fields() {
        assert!(find_login_data(&json!({"login": null})).is_none());
        assert!(find_login_data(&json!({"account": {"authToken": "A"}})).is_none());
        assert!(find_login_data(&json!({"login": "not-an-object"})).is_none());
        assert!(find_login_data(&json!(null)).is_none());
    }
}
