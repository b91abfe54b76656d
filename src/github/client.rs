//! GitHub API client.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;
use url::Url;

use crate::error::{DirCloneError, Result};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Client for interacting with the GitHub API.
///
/// Requests are authenticated only when a token is set.
#[derive(Clone)]
pub struct GitHubClient {
    pub(crate) token: Option<String>,
    pub(crate) base_url: String,
    pub(crate) client: Client,
}

impl GitHubClient {
    /// Create a client for api.github.com with an optional token.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            base_url: DEFAULT_API_URL.into(),
            client: Client::new(),
        }
    }

    /// Create an unauthenticated client.
    pub fn anonymous() -> Self {
        Self::new(None)
    }

    /// Create a client for GitHub Enterprise (or any compatible server) with a
    /// custom base URL.
    pub fn with_base_url(token: Option<String>, base_url: impl Into<String>) -> Result<Self> {
        let mut url = base_url.into();
        Url::parse(&url)
            .map_err(|e| DirCloneError::InvalidConfig(format!("Invalid API URL '{}': {}", url, e)))?;
        // Remove trailing slash if present
        while url.ends_with('/') {
            url.pop();
        }
        Ok(Self {
            token,
            base_url: url,
            client: Client::new(),
        })
    }

    /// Create a client using the GITHUB_TOKEN environment variable, if set.
    pub fn from_env() -> Self {
        Self::new(std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()))
    }

    /// Replace the underlying HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Whether requests carry an Authorization header.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the default headers for API requests.
    pub(crate) fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                DirCloneError::InvalidConfig("token contains invalid characters".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("gitdirclone"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// GET an absolute URL and fail on any non-success status.
    pub(crate) fn send(&self, url: &str) -> Result<Response> {
        debug!(url, authenticated = self.is_authenticated(), "GET");
        let response = self.client.get(url).headers(self.headers()?).send()?;
        check_status(response, url)
    }

    /// GET an API endpoint and return the body as text.
    pub(crate) fn get_text(&self, endpoint: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, endpoint);
        Ok(self.send(&url)?.text()?)
    }
}

/// Map error statuses to [`DirCloneError`] variants.
fn check_status(response: Response, resource: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let rate_limited = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        == Some("0");

    match status {
        StatusCode::NOT_FOUND => Err(DirCloneError::NotFound {
            resource: strip_query(resource).to_string(),
        }),
        StatusCode::UNAUTHORIZED => Err(DirCloneError::Unauthorized),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if rate_limited => {
            let reset = response
                .headers()
                .get("x-ratelimit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            Err(DirCloneError::RateLimited { reset })
        }
        _ => {
            let body = response.text().unwrap_or_default();
            Err(DirCloneError::Api {
                status,
                message: api_message(&body),
            })
        }
    }
}

/// GitHub error bodies look like `{"message": "...", "documentation_url": "..."}`.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}
