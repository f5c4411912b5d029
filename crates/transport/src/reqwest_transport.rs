//! Default network transport backed by `reqwest`

use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::{Transport, TransportFuture};

/// Sends each request with a shared `reqwest::Client`.
///
/// Every HTTP status is returned as `Ok(HttpResponse)`; the caller decides what
/// a 4xx/5xx means.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("building HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (shared connection pool, custom TLS, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn id(&self) -> &str {
        "reqwest"
    }

    fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;
            debug!(%method, %url, "sending request");

            let response = self
                .client
                .request(method, &url)
                .headers(headers)
                .body(body)
                .send()
                .await
                .map_err(|e| Error::Http(format!("request to {url} failed: {e}")))?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| Error::Http(format!("reading response body: {e}")))?;

            debug!(%url, status = status.as_u16(), bytes = body.len(), "received response");
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}
