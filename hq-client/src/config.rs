//! Client configuration

/// Client configuration for connecting to HQ
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "https://hq.example.com")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Value sent in the User-Agent header
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
            user_agent: format!("pack-station/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the User-Agent header value
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Create an HQ client from this configuration
    pub fn build(&self) -> crate::ClientResult<crate::HqClient> {
        crate::HqClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
