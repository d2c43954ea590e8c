//! HTTP client for network-based API calls

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::ApiResponse;
use tracing::{debug, instrument, warn};

/// Plain `{ "error": "..." }` body some HQ routes return
#[derive(serde::Deserialize)]
struct PlainErrorBody {
    error: String,
}

/// HTTP client for making network requests to HQ
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(ClientError::Config("base_url is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.request(Method::GET, path).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a request whose success body is ignored
    pub async fn send_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<()> {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(status, response.text().await?));
        }
        Ok(())
    }

    /// Handle the HTTP response
    #[instrument(skip(response), fields(status = %response.status(), url = %response.url()))]
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = Self::error_from(status, text);
            warn!(error = %err, "HQ request failed");
            return Err(err);
        }

        debug!(bytes = text.len(), "HQ response received");
        serde_json::from_str(&text).map_err(|e| {
            ClientError::InvalidResponse(format!("{} (body: {})", e, truncate(&text, 200)))
        })
    }

    /// Extract the error message HQ put in a failed response body
    fn error_from(status: reqwest::StatusCode, text: String) -> ClientError {
        if let Ok(envelope) = serde_json::from_str::<ApiResponse<()>>(&text)
            && let Some(code) = envelope.code
        {
            return ClientError::Api {
                code,
                message: envelope.message,
                details: envelope.details,
            };
        }

        if let Ok(body) = serde_json::from_str::<PlainErrorBody>(&text) {
            return ClientError::Status {
                status,
                message: body.error,
            };
        }

        let message = if text.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            text
        };
        ClientError::Status { status, message }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
