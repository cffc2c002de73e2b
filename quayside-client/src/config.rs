//! Configuration for the marketplace client.

use std::time::Duration;

/// Configuration options for a marketplace API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the marketplace API.
    pub base_url: String,

    /// Client id sent with every request, when the deployment requires one.
    pub client_id: Option<String>,

    /// Timeout for network operations.
    pub timeout: Duration,

    /// User agent header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Creates a new ClientConfig pointed at the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("quayside-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the client id.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the network timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("https://api.quayside.dev/v1")
    }
}
