//! Client that sends each operation as-is through a `Transport`
//!
//! Holds no credentials. Wrapping the transport in a `session::Session`
//! (see `StatefulClient`) is what makes calls authenticated.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use transport::{
    GraphqlRequest, GraphqlResponse, HeaderName, HeaderValue, HttpRequest, HttpResponse, Transport,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::operation::{self, Operation, build_query};
use crate::types::*;

const CLIENT_ID_HEADER: &str = "x-client-id";

/// Build the POST for one operation. Shared with the session's refresh hook.
pub fn graphql_request(
    url: &str,
    client_id: &HeaderValue,
    op: &Operation,
    selection: &str,
    variables: Option<Value>,
) -> transport::Result<HttpRequest> {
    let body = GraphqlRequest {
        query: build_query(op, selection),
        operation_name: op.operation_name(),
        variables,
    };
    let request = HttpRequest::post_json(url, &body)?;
    Ok(request.with_header(HeaderName::from_static(CLIENT_ID_HEADER), client_id.clone()))
}

pub(crate) fn client_id_header(client_id: &str) -> Result<HeaderValue> {
    if client_id.is_empty() {
        return Err(ClientError::Config("client id must not be empty".into()));
    }
    HeaderValue::from_str(client_id)
        .map_err(|e| ClientError::Config(format!("client id is not a valid header value: {e}")))
}

fn to_variables<A: Serialize>(args: &A) -> Result<Option<Value>> {
    serde_json::to_value(args)
        .map(Some)
        .map_err(|e| ClientError::Decode(format!("serializing variables: {e}")))
}

/// Typed access to the API's operations.
///
/// Every method takes the selection set to request and decodes the field's
/// result into the caller's type, so `T` only needs the fields selected.
pub struct StatelessClient {
    config: ClientConfig,
    client_id: HeaderValue,
    transport: Arc<dyn Transport>,
}

impl StatelessClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let client_id = client_id_header(&config.client_id)?;
        Ok(Self {
            config,
            client_id,
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run any operation and decode `data[op.name]`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        op: &Operation,
        selection: &str,
        variables: Option<Value>,
    ) -> Result<T> {
        let request = graphql_request(
            &self.config.graphql_url(),
            &self.client_id,
            op,
            selection,
            variables,
        )?;
        debug!(transport = self.transport.id(), operation = op.name, "sending operation");
        let response = self.transport.send(request).await?;
        decode_field(&response, op.name)
    }

    async fn execute_with<T: DeserializeOwned, A: Serialize>(
        &self,
        op: &Operation,
        selection: &str,
        args: &A,
    ) -> Result<T> {
        self.execute(op, selection, to_variables(args)?).await
    }

    pub async fn account<T: DeserializeOwned>(&self, selection: &str) -> Result<T> {
        self.execute(&operation::ACCOUNT, selection, None).await
    }

    pub async fn login<T: DeserializeOwned>(&self, selection: &str, args: &LoginArgs) -> Result<T> {
        self.execute_with(&operation::LOGIN, selection, args).await
    }

    pub async fn login_refresh<T: DeserializeOwned>(
        &self,
        selection: &str,
        args: &LoginRefreshArgs,
    ) -> Result<T> {
        self.execute_with(&operation::LOGIN_REFRESH, selection, args).await
    }

    pub async fn create_account<T: DeserializeOwned>(
        &self,
        selection: &str,
        args: &CreateAccountArgs,
    ) -> Result<T> {
        self.execute_with(&operation::CREATE_ACCOUNT, selection, args).await
    }

    pub async fn change_password<T: DeserializeOwned>(
        &self,
        selection: &str,
        args: &ChangePasswordArgs,
    ) -> Result<T> {
        self.execute_with(&operation::CHANGE_PASSWORD, selection, args).await
    }

    pub async fn reset_password<T: DeserializeOwned>(
        &self,
        selection: &str,
        args: &ResetPasswordArgs,
    ) -> Result<T> {
        self.execute_with(&operation::RESET_PASSWORD, selection, args).await
    }

    pub async fn request_password_reset<T: DeserializeOwned>(
        &self,
        selection: &str,
        args: &RequestPasswordResetArgs,
    ) -> Result<T> {
        self.execute_with(&operation::REQUEST_PASSWORD_RESET, selection, args).await
    }

    pub async fn verify_email_address<T: DeserializeOwned>(
        &self,
        selection: &str,
        args: &VerifyEmailAddressArgs,
    ) -> Result<T> {
        self.execute_with(&operation::VERIFY_EMAIL_ADDRESS, selection, args).await
    }

    pub async fn resend_verification_email<T: DeserializeOwned>(
        &self,
        selection: &str,
    ) -> Result<T> {
        self.execute(&operation::RESEND_VERIFICATION_EMAIL, selection, None).await
    }

    pub async fn delete_account_request<T: DeserializeOwned>(
        &self,
        selection: &str,
        args: &DeleteAccountRequestArgs,
    ) -> Result<T> {
        self.execute_with(&operation::DELETE_ACCOUNT_REQUEST, selection, args).await
    }

    pub async fn find_show<T: DeserializeOwned>(
        &self,
        selection: &str,
        args: &FindShowArgs,
    ) -> Result<T> {
        self.execute_with(&operation::FIND_SHOW, selection, args).await
    }

    pub async fn search_shows<T: DeserializeOwned>(
        &self,
        selection: &str,
        args: &SearchShowsArgs,
    ) -> Result<T> {
        self.execute_with(&operation::SEARCH_SHOWS, selection, args).await
    }

    pub async fn find_episode<T: DeserializeOwned>(
        &self,
        selection: &str,
        args: &FindEpisodeArgs,
    ) -> Result<T> {
        self.execute_with(&operation::FIND_EPISODE, selection, args).await
    }

    pub async fn recently_added_episodes<T: DeserializeOwned>(
        &self,
        selection: &str,
        args: &RecentlyAddedEpisodesArgs,
    ) -> Result<T> {
        self.execute_with(&operation::RECENTLY_ADDED_EPISODES, selection, args).await
    }

    /// `GET /status`.
    pub async fn health_check(&self) -> Result<ApiHealth> {
        let request = HttpRequest::get(self.config.status_url())
            .with_header(HeaderName::from_static(CLIENT_ID_HEADER), self.client_id.clone());
        let response = self.transport.send(request).await?;

        let payload: Value = response
            .json()
            .map_err(|_| status_or_decode(&response, "health payload"))?;
        if let Some(errors) = payload.get("errors").filter(|e| !e.is_null()) {
            let errors = serde_json::from_value(errors.clone())
                .map_err(|e| ClientError::Decode(format!("errors array: {e}")))?;
            return Err(ClientError::Graphql {
                status: response.status,
                errors,
            });
        }
        serde_json::from_value(payload)
            .map_err(|e| ClientError::Decode(format!("health payload: {e}")))
    }
}

/// Map a GraphQL response to the value of one root field.
fn decode_field<T: DeserializeOwned>(response: &HttpResponse, field: &str) -> Result<T> {
    let envelope: GraphqlResponse = response
        .json()
        .map_err(|_| status_or_decode(response, "GraphQL envelope"))?;

    if let Some(errors) = envelope.errors {
        return Err(ClientError::Graphql {
            status: response.status,
            errors,
        });
    }
    if !response.is_success() {
        return Err(status_error(response));
    }

    let value = envelope
        .data
        .and_then(|mut data| data.get_mut(field).map(Value::take))
        .unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| ClientError::Decode(format!("{field}: {e}")))
}

fn status_or_decode(response: &HttpResponse, what: &str) -> ClientError {
    if response.is_success() {
        ClientError::Decode(format!("{what} is not valid JSON"))
    } else {
        status_error(response)
    }
}

fn status_error(response: &HttpResponse) -> ClientError {
    ClientError::Status {
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    }
}
