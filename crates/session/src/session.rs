//! The session decorator around a stateless transport

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use credentials::{CredentialStore, LoginData};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use transport::header::AUTHORIZATION;
use transport::{
    GraphqlResponse, HeaderMap, HeaderValue, HttpRequest, HttpResponse, Transport,
    TransportFuture,
};

use crate::capture::{CaptureOutcome, CredentialManager};
use crate::expiry::{find_login_data, is_access_token_expired};
use crate::refresh::{RefreshFailurePolicy, RefreshRequestBuilder};
use crate::telemetry;

/// Session behavior knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub refresh_failure: RefreshFailurePolicy,
}

/// One exchange with the inner transport, plus what the session learned from it.
pub(crate) struct Attempt {
    pub(crate) response: HttpResponse,
    /// Access token attached to this request (`None` when logged out).
    pub(crate) sent_token: Option<String>,
    /// Refresh generation observed before sending.
    pub(crate) generation: u64,
    /// Decoded body, `None` when the body was not a GraphQL JSON envelope.
    pub(crate) envelope: Option<GraphqlResponse>,
}

impl Attempt {
    fn is_expired(&self) -> bool {
        self.envelope
            .as_ref()
            .is_some_and(|envelope| {
                is_access_token_expired(self.response.status, envelope.errors())
            })
    }
}

/// Transport decorator that carries, refreshes and persists credentials.
///
/// Presents the same `Transport` contract it wraps. Transport errors from the
/// inner transport propagate unchanged; only a transported response reporting
/// an expired access token triggers the refresh-and-retry path, and only once
/// per call.
pub struct Session {
    pub(crate) inner: Arc<dyn Transport>,
    pub(crate) credentials: CredentialManager,
    pub(crate) refresh_lock: Mutex<()>,
    /// Bumped under `refresh_lock` after every completed exchange.
    pub(crate) refresh_generation: AtomicU64,
    pub(crate) refresh_request: RefreshRequestBuilder,
    pub(crate) config: SessionConfig,
}

impl Session {
    pub fn new(
        inner: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        refresh_request: RefreshRequestBuilder,
        config: SessionConfig,
    ) -> Self {
        Self {
            inner,
            credentials: CredentialManager::new(store),
            refresh_lock: Mutex::new(()),
            refresh_generation: AtomicU64::new(0),
            refresh_request,
            config,
        }
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    pub async fn login(&self, data: &LoginData) -> crate::Result<()> {
        self.credentials.login(data).await
    }

    pub async fn logout(&self) -> crate::Result<()> {
        self.credentials.logout().await
    }

    /// Send `request` with the current access token.
    ///
    /// On an expiry error: refresh (shared with concurrent callers), then send
    /// exactly once more and return that second response whatever it says.
    /// Login payloads in the returned response are persisted.
    pub async fn authenticated_call(
        &self,
        request: HttpRequest,
    ) -> transport::Result<HttpResponse> {
        let first = self.dispatch(request.clone()).await?;

        let last = if first.is_expired() {
            debug!(url = %request.url, "access token expired, refreshing before retry");
            self.refresh_tokens(first.sent_token.as_deref(), first.generation).await;
            telemetry::record_retry();
            self.dispatch(request).await?
        } else {
            first
        };

        self.capture(&last).await?;
        Ok(last.response)
    }

    /// Attach the current token and send. No expiry handling, no capture.
    pub(crate) async fn dispatch(&self, mut request: HttpRequest) -> transport::Result<Attempt> {
        let generation = self.refresh_generation.load(Ordering::Acquire);
        let token = self.credentials.access_token().await?;
        attach_bearer(&mut request.headers, token.as_deref())?;

        let response = self.inner.send(request).await?;
        let envelope = response.json::<GraphqlResponse>().ok();
        Ok(Attempt {
            response,
            sent_token: token,
            generation,
            envelope,
        })
    }

    /// Persist credentials found in a response. Returns the operation name
    /// when a new pair was stored.
    pub(crate) async fn capture(&self, attempt: &Attempt) -> crate::Result<Option<&'static str>> {
        let Some(data) = attempt.envelope.as_ref().and_then(|e| e.data.as_ref()) else {
            return Ok(None);
        };
        let Some((operation, login)) = find_login_data(data) else {
            return Ok(None);
        };
        match self.credentials.capture(operation, &login).await? {
            CaptureOutcome::Stored => {
                telemetry::record_capture(operation);
                Ok(Some(operation))
            }
            CaptureOutcome::NoTokens | CaptureOutcome::Partial => Ok(None),
        }
    }
}

impl Transport for Session {
    fn id(&self) -> &str {
        "session"
    }

    fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
        Box::pin(self.authenticated_call(request))
    }
}

/// Set `Authorization: Bearer <token>`, replacing any caller-supplied value.
/// With no session the bearer value is empty.
fn attach_bearer(headers: &mut HeaderMap, token: Option<&str>) -> transport::Result<()> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.unwrap_or_default()))
        .map_err(|e| {
            transport::Error::InvalidRequest(format!(
                "access token is not a valid header value: {e}"
            ))
        })?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    Ok(())
}
