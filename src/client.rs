use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, header};
use std::env;
use std::time::{Duration, Instant};
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::transport::Transport;
use crate::types::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse};

/// Base URL used when neither an argument nor `COLLOQUY_API_URL` supplies one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Environment variable consulted for the base URL.
pub const API_URL_ENV: &str = "COLLOQUY_API_URL";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const CHAT_PATH: &str = "api/v1/chat";
const ASK_PATH: &str = "api/v1/ask";
const HEALTH_PATH: &str = "health";
const READINESS_PATH: &str = "health/ready";

const SEND_FAILED: &str = "Failed to send message";
const INVALID_RESPONSE: &str = "Invalid response from assistant service";
const HEALTH_CHECK_FAILED: &str = "Health check failed";
const READINESS_CHECK_FAILED: &str = "Readiness check failed";

/// HTTP client for the assistant service.
///
/// The client holds nothing but its configuration and a connection pool, so a
/// single value may be shared by any number of sessions.
#[derive(Debug, Clone)]
pub struct AssistantClient {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl AssistantClient {
    /// Create a new client.
    ///
    /// The base URL can be provided directly or read from the COLLOQUY_API_URL
    /// environment variable; it defaults to `http://localhost:8000`.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        };
        let base_url = normalize_base_url(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::transport(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one conversational turn.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint(CHAT_PATH)?;
        let builder = self.client.post(url).json(&request);
        let response = self.execute(builder, "chat").await?;
        Self::chat_response(response).await
    }

    /// Ask a one-shot question; the message travels in the query string.
    pub async fn ask(&self, message: &str) -> Result<ChatResponse> {
        let url = self.ask_url(message)?;
        let builder = self.client.post(url);
        let response = self.execute(builder, "ask").await?;
        Self::chat_response(response).await
    }

    /// Check whether the service is up.
    pub async fn health_check(&self) -> Result<HealthResponse> {
        self.health(HEALTH_PATH, "health", HEALTH_CHECK_FAILED).await
    }

    /// Check whether the service is ready to answer.
    pub async fn readiness_check(&self) -> Result<HealthResponse> {
        self.health(READINESS_PATH, "readiness", READINESS_CHECK_FAILED)
            .await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn ask_url(&self, message: &str) -> Result<Url> {
        let mut url = self.endpoint(ASK_PATH)?;
        url.query_pairs_mut().append_pair("message", message);
        Ok(url)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    async fn execute(&self, builder: RequestBuilder, operation: &'static str) -> Result<Response> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = builder.headers(self.default_headers()).send().await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        match result {
            Ok(response) => {
                tracing::debug!(operation, status = response.status().as_u16(), "request complete");
                if !response.status().is_success() {
                    CLIENT_REQUEST_ERRORS.click();
                }
                Ok(response)
            }
            Err(e) => {
                CLIENT_REQUEST_ERRORS.click();
                tracing::warn!(operation, error = %e, "request failed");
                Err(self.send_error(e))
            }
        }
    }

    fn send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::transport(
                format!(
                    "Request timed out after {} seconds",
                    self.timeout.as_secs_f64()
                ),
                Some(Box::new(e)),
            )
        } else if e.is_connect() {
            Error::transport(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::transport(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    async fn chat_response(response: Response) -> Result<ChatResponse> {
        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        let body = read_body(response).await?;
        serde_json::from_str::<ChatResponse>(&body).map_err(|e| {
            tracing::warn!(error = %e, "malformed chat response");
            Error::remote(None, INVALID_RESPONSE)
        })
    }

    /// Translate a non-success chat/ask response into a remote error.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        let detail = match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.detail_message().map(String::from)),
            Err(_) => None,
        };
        Error::remote(
            Some(status_code),
            detail.unwrap_or_else(|| SEND_FAILED.to_string()),
        )
    }

    async fn health(
        &self,
        path: &str,
        operation: &'static str,
        failure: &'static str,
    ) -> Result<HealthResponse> {
        let url = self.endpoint(path)?;
        let response = self.execute(self.client.get(url), operation).await?;
        if !response.status().is_success() {
            return Err(Error::transport(failure, None));
        }
        let body = read_body(response).await?;
        serde_json::from_str::<HealthResponse>(&body).map_err(|e| {
            Error::transport(format!("{failure}: malformed response"), Some(Box::new(e)))
        })
    }
}

#[async_trait::async_trait]
impl Transport for AssistantClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        AssistantClient::chat(self, request).await
    }

    async fn ask(&self, message: &str) -> Result<ChatResponse> {
        AssistantClient::ask(self, message).await
    }

    async fn health_check(&self) -> Result<HealthResponse> {
        AssistantClient::health_check(self).await
    }

    async fn readiness_check(&self) -> Result<HealthResponse> {
        AssistantClient::readiness_check(self).await
    }
}

async fn read_body(response: Response) -> Result<String> {
    response.text().await.map_err(|e| {
        Error::transport(
            format!("Failed to read response body: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Parse a base URL so that endpoint paths append to, rather than replace,
/// any path prefix it carries.
fn normalize_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url.trim())?;
    if url.cannot_be_a_base() {
        return Err(Error::url(
            format!("{base_url} cannot be used as a base URL"),
            None,
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
