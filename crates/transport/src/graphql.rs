//! GraphQL request/response envelopes

use serde::{Deserialize, Serialize};

/// Body POSTed to the `/graphql` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    pub operation_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

/// Response envelope. GraphQL faults come back with HTTP 200 and a populated
/// `errors` array, so `data` and `errors` may both be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlResponse<T = serde_json::Value> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphqlError>>,
}

impl<T> GraphqlResponse<T> {
    /// Errors reported by the server, empty when the field is absent or null.
    pub fn errors(&self) -> &[GraphqlError] {
        self.errors.as_deref().unwrap_or_default()
    }
}

/// Location of an error within the query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    /// Either a field name or a list of path segments, depending on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<GraphqlErrorLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            locations: Vec::new(),
            extensions: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_camel_case() {
        let req = GraphqlRequest {
            query: "query Account {\n  account { id }\n}".into(),
            operation_name: "Account".into(),
            variables: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["operationName"], "Account");
        assert!(json.get("variables").is_none());
    }

    #[test]
    fn response_with_errors_and_null_data() {
        let res: GraphqlResponse = serde_json::from_str(
            r#"{
                "data": {"account": null},
                "errors": [{
                    "message": "Access token is expired",
                    "path": ["account"],
                    "locations": [{"line": 2, "column": 3}]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(res.errors().len(), 1);
        assert_eq!(res.errors()[0].message, "Access token is expired");
        assert_eq!(res.errors()[0].locations[0].line, 2);
        assert!(res.data.unwrap()["account"].is_null());
    }

    #[test]
    fn missing_fields_default() {
        let res: GraphqlResponse = serde_json::from_str("{}").unwrap();
        assert!(res.data.is_none());
        assert!(res.errors().is_empty());
    }

    #[test]
    fn string_path_accepted() {
        let err: GraphqlError =
            serde_json::from_str(r#"{"message": "Bad login credentials", "path": "login"}"#)
                .unwrap();
        assert_eq!(err.path, Some(serde_json::json!("login")));
    }
}
