//! Single-flight refresh of the access/refresh token pair
//!
//! State machine: Idle → Refreshing → Idle, implemented as one async mutex held
//! for the whole exchange. Every completed exchange bumps a generation counter,
//! and each request remembers the generation it was sent under. A caller that
//! observed expiry while another caller was refreshing waits on the mutex, sees
//! the generation has moved on and skips its own exchange, even when the other
//! exchange failed and left the tokens unchanged.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use tracing::{debug, info, warn};
use transport::HttpRequest;

use crate::session::Session;
use crate::telemetry;

/// Builds the `loginRefresh` request for a refresh token.
///
/// Injected at construction so the session does not need a reference back to
/// the client that owns it.
pub type RefreshRequestBuilder =
    Arc<dyn Fn(&str) -> transport::Result<HttpRequest> + Send + Sync>;

/// What to do with stored credentials when the refresh exchange fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshFailurePolicy {
    /// Leave the tokens in place; the next expired call tries again.
    #[default]
    KeepCredentials,
    /// Clear the session so callers continue unauthenticated.
    Logout,
}

/// Result of one `refresh_tokens` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// This caller performed the exchange and new credentials were stored.
    Refreshed,
    /// Another caller refreshed while this one waited for the lock.
    AlreadyRefreshed,
    /// No refresh token was stored; the session was cleared.
    LoggedOut,
    /// The exchange failed; the failure policy was applied.
    Failed,
}

impl RefreshOutcome {
    /// Label for metrics/logging.
    pub fn label(&self) -> &'static str {
        match self {
            RefreshOutcome::Refreshed => "refreshed",
            RefreshOutcome::AlreadyRefreshed => "already_refreshed",
            RefreshOutcome::LoggedOut => "logged_out",
            RefreshOutcome::Failed => "failed",
        }
    }
}

impl Session {
    /// Number of refresh exchanges completed so far, successful or not.
    pub fn refresh_generation(&self) -> u64 {
        self.refresh_generation.load(Ordering::Acquire)
    }

    /// Exchange the stored refresh token for a new pair, at most one at a time.
    ///
    /// `stale_token` is the access token the caller sent when it saw the
    /// expiry error and `seen_generation` the refresh generation read before
    /// sending. If either has moved on by the time the lock is acquired,
    /// another caller's exchange already answered this expiry, whatever its
    /// result, and no new exchange is issued. Errors are logged and folded into
    /// the outcome; the caller always proceeds to its single retry.
    pub async fn refresh_tokens(
        &self,
        stale_token: Option<&str>,
        seen_generation: u64,
    ) -> RefreshOutcome {
        let _refreshing = self.refresh_lock.lock().await;

        if self.refresh_generation() != seen_generation {
            debug!("refresh completed while waiting, skipping refresh");
            telemetry::record_refresh(RefreshOutcome::AlreadyRefreshed);
            return RefreshOutcome::AlreadyRefreshed;
        }

        let outcome = self.exchange(stale_token).await;
        if outcome != RefreshOutcome::AlreadyRefreshed {
            self.refresh_generation.fetch_add(1, Ordering::AcqRel);
        }
        outcome
    }

    /// Body of the refresh critical section. Caller holds `refresh_lock`.
    async fn exchange(&self, stale_token: Option<&str>) -> RefreshOutcome {
        let current = match self.credentials.snapshot().await {
            Ok(current) => current,
            Err(e) => {
                warn!(error = %e, "could not read credentials for refresh");
                return self.refresh_failed().await;
            }
        };

        if current.auth_token.as_deref() != stale_token {
            debug!("access token changed while waiting, skipping refresh");
            telemetry::record_refresh(RefreshOutcome::AlreadyRefreshed);
            return RefreshOutcome::AlreadyRefreshed;
        }

        let Some(refresh_token) = current.refresh_token else {
            info!("no refresh token stored, logging out");
            if let Err(e) = self.credentials.logout().await {
                warn!(error = %e, "failed to clear credentials");
            }
            telemetry::record_refresh(RefreshOutcome::LoggedOut);
            return RefreshOutcome::LoggedOut;
        };

        let request = match (self.refresh_request)(&refresh_token) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "could not build refresh request");
                return self.refresh_failed().await;
            }
        };

        debug!("refreshing access token");
        let attempt = match self.dispatch(request).await {
            Ok(attempt) => attempt,
            Err(e) => {
                warn!(error = %e, "refresh request failed");
                return self.refresh_failed().await;
            }
        };

        // The refresh response is persisted by the same capture path as any
        // other call; success means it actually carried a new pair.
        match self.capture(&attempt).await {
            Ok(Some(_)) => {
                info!("access token refreshed");
                telemetry::record_refresh(RefreshOutcome::Refreshed);
                RefreshOutcome::Refreshed
            }
            Ok(None) => {
                let errors = attempt
                    .envelope
                    .as_ref()
                    .map(|e| e.errors().iter().map(|e| e.message.as_str()).collect::<Vec<_>>())
                    .unwrap_or_default();
                warn!(
                    status = attempt.response.status.as_u16(),
                    ?errors,
                    "refresh response carried no credentials"
                );
                self.refresh_failed().await
            }
            Err(e) => {
                warn!(error = %e, "failed to persist refreshed credentials");
                self.refresh_failed().await
            }
        }
    }

    async fn refresh_failed(&self) -> RefreshOutcome {
        if self.config.refresh_failure == RefreshFailurePolicy::Logout {
            info!("refresh failed, clearing credentials per policy");
            if let Err(e) = self.credentials.logout().await {
                warn!(error = %e, "failed to clear credentials");
            }
        }
        telemetry::record_refresh(RefreshOutcome::Failed);
        RefreshOutcome::Failed
    }
}
