use std::time::Duration;

/// Where and as whom the client talks to the API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root without a trailing slash, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Sent as `X-Client-ID` on every request.
    pub client_id: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.base_url)
    }

    pub fn status_url(&self) -> String {
        format!("{}/status", self.base_url)
    }
}
