//! Credential persistence with the all-or-nothing triple invariant
//!
//! The store holds three independent keys, but callers only ever see either a
//! full session (access + refresh token, optional account) or nothing. Every
//! write takes the data lock, so a reader using `snapshot()` never observes a
//! new access token paired with an old refresh token.

use std::sync::Arc;

use credentials::{ACCESS_TOKEN_KEY, ACCOUNT_KEY, CredentialStore, LoginData, REFRESH_TOKEN_KEY};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// What `CredentialManager::capture` did with a login payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Both tokens present, credentials replaced.
    Stored,
    /// Selection did not include tokens, nothing to persist.
    NoTokens,
    /// Only one of the two tokens was selected; ignored to keep the pair consistent.
    Partial,
}

/// Reads and writes the credential triple.
pub struct CredentialManager {
    store: Arc<dyn CredentialStore>,
    lock: Mutex<()>,
}

impl CredentialManager {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Current access token without taking the lock.
    ///
    /// Used right before dispatching a request. A stale value is corrected by
    /// the refresh-and-retry path, not prevented here.
    pub async fn access_token(&self) -> Result<Option<String>> {
        Ok(non_empty(self.store.get(ACCESS_TOKEN_KEY).await?))
    }

    /// Current refresh token without taking the lock.
    pub async fn refresh_token(&self) -> Result<Option<String>> {
        Ok(non_empty(self.store.get(REFRESH_TOKEN_KEY).await?))
    }

    /// Cached account snapshot decoded into `T`.
    pub async fn account<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self.store.get(ACCOUNT_KEY).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| Error::Account(e.to_string())),
            None => Ok(None),
        }
    }

    /// Consistent view of all three entries, read under the data lock.
    pub async fn snapshot(&self) -> Result<LoginData> {
        let _guard = self.lock.lock().await;
        let auth_token = non_empty(self.store.get(ACCESS_TOKEN_KEY).await?);
        let refresh_token = non_empty(self.store.get(REFRESH_TOKEN_KEY).await?);
        let account = match self.store.get(ACCOUNT_KEY).await? {
            Some(raw) => {
                Some(serde_json::from_str(&raw).map_err(|e| Error::Account(e.to_string()))?)
            }
            None => None,
        };
        Ok(LoginData {
            auth_token,
            refresh_token,
            account,
        })
    }

    pub async fn is_logged_in(&self) -> Result<bool> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.auth_token.is_some() && snapshot.refresh_token.is_some())
    }

    /// Replace or clear the whole triple.
    ///
    /// - both tokens present: store both, store or remove the account
    /// - both tokens absent: remove all three (logout)
    /// - exactly one token: `PartialCredentials`, store untouched
    ///
    /// Empty strings and a JSON `null` account count as absent.
    pub async fn set_credentials(&self, data: &LoginData) -> Result<()> {
        let access = data.auth_token.as_deref().filter(|t| !t.is_empty());
        let refresh = data.refresh_token.as_deref().filter(|t| !t.is_empty());
        let account = data.account.as_ref().filter(|a| !a.is_null());

        let _guard = self.lock.lock().await;
        match (access, refresh) {
            (Some(access), Some(refresh)) => {
                self.store.set(ACCESS_TOKEN_KEY, access).await?;
                self.store.set(REFRESH_TOKEN_KEY, refresh).await?;
                match account {
                    Some(account) => {
                        self.store.set(ACCOUNT_KEY, &account.to_string()).await?
                    }
                    None => self.store.remove(ACCOUNT_KEY).await?,
                }
                info!(has_account = account.is_some(), "credentials stored");
            }
            (None, None) => {
                self.store.remove(ACCOUNT_KEY).await?;
                self.store.remove(ACCESS_TOKEN_KEY).await?;
                self.store.remove(REFRESH_TOKEN_KEY).await?;
                info!("credentials cleared");
            }
            _ => return Err(Error::PartialCredentials),
        }
        Ok(())
    }

    /// Start a session from a login payload.
    pub async fn login(&self, data: &LoginData) -> Result<()> {
        self.set_credentials(data).await
    }

    /// Forget all credentials.
    pub async fn logout(&self) -> Result<()> {
        self.set_credentials(&LoginData::empty()).await
    }

    /// Persist a payload discovered in a response, if it carries a token pair.
    ///
    /// Unlike `set_credentials`, a payload without tokens is not a logout: the
    /// caller simply did not select them.
    pub async fn capture(&self, operation: &str, data: &LoginData) -> Result<CaptureOutcome> {
        match (&data.auth_token, &data.refresh_token) {
            (Some(_), Some(_)) => {
                self.set_credentials(data).await?;
                debug!(operation, "captured credentials from response");
                Ok(CaptureOutcome::Stored)
            }
            (None, None) => {
                debug!(operation, "login payload has no tokens, nothing to capture");
                Ok(CaptureOutcome::NoTokens)
            }
            _ => {
                warn!(
                    operation,
                    "login payload selected only one token, leaving stored credentials unchanged"
                );
                Ok(CaptureOutcome::Partial)
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
