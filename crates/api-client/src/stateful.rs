//! Client that owns a session: tokens are attached, refreshed and stored for you

use std::sync::Arc;

use credentials::{Account, CredentialStore, LoginData, MemoryStore};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use session::{RefreshRequestBuilder, Session, SessionConfig};
use transport::{ReqwestTransport, Transport};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::operation::{self, Operation};
use crate::stateless::{StatelessClient, client_id_header, graphql_request};
use crate::types::*;

/// Selection used for every credential-bearing operation. Fixed so the
/// session always receives both tokens and a full account snapshot.
pub const LOGIN_DATA_SELECTION: &str = "{
  authToken
  refreshToken
  account {
    id
    username
    email
    createdAt
    deletedAt
    emailVerified
    profileUrl
    role
  }
}";

pub struct StatefulClient {
    session: Arc<Session>,
    api: StatelessClient,
}

impl StatefulClient {
    /// Wrap `transport` in a session backed by `store`.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        session_config: SessionConfig,
    ) -> Result<Self> {
        let client_id = client_id_header(&config.client_id)?;
        let graphql_url = config.graphql_url();
        let refresh_request: RefreshRequestBuilder = Arc::new(move |refresh_token: &str| {
            graphql_request(
                &graphql_url,
                &client_id,
                &operation::LOGIN_REFRESH,
                LOGIN_DATA_SELECTION,
                Some(json!({ "refreshToken": refresh_token })),
            )
        });

        let session = Arc::new(Session::new(transport, store, refresh_request, session_config));
        let api = StatelessClient::new(config, session.clone())?;
        Ok(Self { session, api })
    }

    /// reqwest transport and an in-memory store.
    pub fn with_defaults(config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.timeout)?);
        Self::new(
            config,
            transport,
            Arc::new(MemoryStore::new()),
            SessionConfig::default(),
        )
    }

    /// Authenticated access to every operation with caller-chosen selections.
    pub fn api(&self) -> &StatelessClient {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn login(&self, args: &LoginArgs) -> Result<LoginData> {
        self.api.login(LOGIN_DATA_SELECTION, args).await
    }

    pub async fn login_refresh(&self, args: &LoginRefreshArgs) -> Result<LoginData> {
        self.api.login_refresh(LOGIN_DATA_SELECTION, args).await
    }

    pub async fn create_account(&self, args: &CreateAccountArgs) -> Result<LoginData> {
        self.api.create_account(LOGIN_DATA_SELECTION, args).await
    }

    pub async fn change_password(&self, args: &ChangePasswordArgs) -> Result<LoginData> {
        self.api.change_password(LOGIN_DATA_SELECTION, args).await
    }

    pub async fn reset_password(&self, args: &ResetPasswordArgs) -> Result<LoginData> {
        self.api.reset_password(LOGIN_DATA_SELECTION, args).await
    }

    pub async fn logout(&self) -> Result<()> {
        Ok(self.session.logout().await?)
    }

    pub async fn is_logged_in(&self) -> Result<bool> {
        Ok(self.session.credentials().is_logged_in().await?)
    }

    /// Account snapshot stored by the last login, without a network call.
    pub async fn stored_account(&self) -> Result<Option<Account>> {
        Ok(self.session.credentials().account().await?)
    }

    pub async fn account<T: DeserializeOwned>(&self, selection: &str) -> Result<T> {
        self.api.account(selection).await
    }

    pub async fn execute<T: DeserializeOwned>(
        &self,
        op: &Operation,
        selection: &str,
        variables: Option<Value>,
    ) -> Result<T> {
        self.api.execute(op, selection, variables).await
    }

    pub async fn health_check(&self) -> Result<ApiHealth> {
        self.api.health_check().await
    }
}
