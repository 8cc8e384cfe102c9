//! HTTP backend abstraction for the GitHub REST API.
//!
//! The production implementation uses reqwest with automatic retry for
//! transient errors. Tests inject [`testing::FakeBackend`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{GitHubError, GitHubResult};
use crate::models::{ApiConfig, ApiErrorBody};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
}

impl HttpMethod {
    /// Whether a failed request may be sent again.
    const fn is_idempotent(self) -> bool {
        !matches!(self, Self::Post)
    }
}

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that talk to the GitHub REST API.
///
/// This is an implementation detail; external code uses the core ports.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Fetch JSON from a URL and deserialize it.
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> GitHubResult<T>;

    /// Fetch one page of a list endpoint; returns the `rel="next"` URL if any.
    async fn get_json_paginated<T: DeserializeOwned + Send>(
        &self,
        url: &Url,
    ) -> GitHubResult<(T, Option<Url>)>;

    /// Send a JSON body (`Value::Null` sends none). Empty responses are `Value::Null`.
    async fn send_json(&self, method: HttpMethod, url: &Url, body: &Value) -> GitHubResult<Value>;

    /// Fetch a binary body, following redirects.
    async fn get_bytes(&self, url: &Url) -> GitHubResult<Vec<u8>>;
}

// ============================================================================
// Status mapping
// ============================================================================

/// Map a non-success status to an error.
pub fn status_error(status: u16, url: &Url, quota_exhausted: bool, message: String) -> GitHubError {
    match status {
        404 => GitHubError::NotFound {
            url: url.to_string(),
        },
        429 => GitHubError::RateLimited {
            url: url.to_string(),
        },
        403 if quota_exhausted => GitHubError::RateLimited {
            url: url.to_string(),
        },
        _ => GitHubError::ApiRequestFailed {
            status,
            url: url.to_string(),
            message,
        },
    }
}

/// The `rel="next"` target of a `Link` header.
pub fn next_link(header: &str) -> Option<Url> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|param| param.trim() == "rel=\"next\"");
        if !is_next {
            return None;
        }
        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok()
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn log_rate_limit(status: u16, url: &Url, headers: &HeaderMap) {
    tracing::warn!(
        status,
        url = %url,
        limit = header_str(headers, "x-ratelimit-limit").unwrap_or("-"),
        remaining = header_str(headers, "x-ratelimit-remaining").unwrap_or("-"),
        used = header_str(headers, "x-ratelimit-used").unwrap_or("-"),
        reset = header_str(headers, "x-ratelimit-reset").unwrap_or("-"),
        "GitHub API request failed"
    );
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest with retry logic.
///
/// Implements exponential backoff for transient server errors (5xx)
/// and network errors. `POST` requests are never retried.
pub struct ReqwestBackend {
    client: reqwest::Client,
    max_retries: u8,
    retry_base_delay_ms: u64,
    auth_token: Option<String>,
    /// Host the token is sent to; other hosts get anonymous requests
    api_host: Option<String>,
}

impl ReqwestBackend {
    pub fn new(config: &ApiConfig) -> GitHubResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_base_delay_ms: config.retry_base_delay_ms,
            auth_token: config.token.clone(),
            api_host: config.base_url.host_str().map(str::to_string),
        })
    }

    fn build_request(&self, method: HttpMethod, url: &Url, body: &Value) -> reqwest::RequestBuilder {
        let mut request = match method {
            HttpMethod::Get => self.client.get(url.as_str()),
            HttpMethod::Post => self.client.post(url.as_str()),
            HttpMethod::Put => self.client.put(url.as_str()),
            HttpMethod::Patch => self.client.patch(url.as_str()),
        };
        if let Some(ref token) = self.auth_token
            && url.host_str() == self.api_host.as_deref()
        {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if !body.is_null() {
            request = request.json(body);
        }
        request
    }

    /// Send a request with automatic retry for transient errors.
    async fn send_with_retry(
        &self,
        method: HttpMethod,
        url: &Url,
        body: &Value,
    ) -> GitHubResult<reqwest::Response> {
        let retries = if method.is_idempotent() {
            self.max_retries
        } else {
            0
        };
        let mut last_error: Option<GitHubError> = None;

        for attempt in 0..=retries {
            if attempt > 0 {
                let delay = Duration::from_millis(
                    self.retry_base_delay_ms * 2u64.pow(u32::from(attempt) - 1),
                );
                tracing::debug!(attempt, ?delay, url = %url, "Retrying request");
                tokio::time::sleep(delay).await;
            }

            match self.build_request(method, url, body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let headers = response.headers().clone();
                    log_rate_limit(status.as_u16(), url, &headers);

                    let message = response
                        .json::<ApiErrorBody>()
                        .await
                        .map(|body| body.message)
                        .unwrap_or_default();
                    let quota_exhausted = header_str(&headers, "x-ratelimit-remaining") == Some("0");
                    let error = status_error(status.as_u16(), url, quota_exhausted, message);

                    // 5xx errors are retryable (server-side issues)
                    if status.is_server_error() && attempt < retries {
                        last_error = Some(error);
                        continue;
                    }
                    return Err(error);
                }
                Err(e) => {
                    // Network errors are retryable
                    if attempt < retries {
                        tracing::debug!(error = %e, url = %url, "Network error");
                        last_error = Some(e.into());
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| GitHubError::InvalidResponse {
            message: "Unknown error during request".to_string(),
        }))
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> GitHubResult<T> {
        let response = self.send_with_retry(HttpMethod::Get, url, &Value::Null).await?;
        Ok(response.json().await?)
    }

    async fn get_json_paginated<T: DeserializeOwned + Send>(
        &self,
        url: &Url,
    ) -> GitHubResult<(T, Option<Url>)> {
        let response = self.send_with_retry(HttpMethod::Get, url, &Value::Null).await?;

        let next = response
            .headers()
            .get(LINK)
            .and_then(|h| h.to_str().ok())
            .and_then(next_link);

        let data: T = response.json().await?;
        Ok((data, next))
    }

    async fn send_json(&self, method: HttpMethod, url: &Url, body: &Value) -> GitHubResult<Value> {
        let response = self.send_with_retry(method, url, body).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn get_bytes(&self, url: &Url) -> GitHubResult<Vec<u8>> {
        let response = self.send_with_retry(HttpMethod::Get, url, &Value::Null).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================
