use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{
    API_KEY_HEADER, DEFAULT_FETCH_BASE_DELAY_MS, DEFAULT_FETCH_MAX_RETRIES,
    DEFAULT_FETCH_TIMEOUT_MS, SyncConfig,
};

const BODY_PREVIEW_CHARS: usize = 200;

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RawResponse, String>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Parsed `Retry-After` header, when the server sent one in seconds.
    pub retry_after: Option<Duration>,
    pub body: Bytes,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal HTTP GET capability the retry loop is written against.
pub trait HttpTransport: Send + Sync {
    fn get<'a>(&'a self, url: &'a str, headers: &'a [(&'static str, String)])
    -> TransportFuture<'a>;
}

impl HttpTransport for reqwest::Client {
    fn get<'a>(
        &'a self,
        url: &'a str,
        headers: &'a [(&'static str, String)],
    ) -> TransportFuture<'a> {
        Box::pin(async move {
            let mut request = reqwest::Client::get(self, url);
            for (name, value) in headers {
                request = request.header(*name, value.as_str());
            }
            let resp = request
                .send()
                .await
                .map_err(|e| format!("request failed: {e}"))?;
            let status = resp.status().as_u16();
            let retry_after = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            let body = resp
                .bytes()
                .await
                .map_err(|e| format!("failed to read response body: {e}"))?;
            Ok(RawResponse {
                status,
                retry_after,
                body,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Timeout { url: String, after: Duration },
    Transport { url: String, message: String },
    Status { url: String, status: u16, preview: String },
    RateLimited { url: String },
    Decode { url: String, message: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { url, after } => {
                write!(f, "{url}: timed out after {}ms", after.as_millis())
            }
            Self::Transport { url, message } => write!(f, "{url}: {message}"),
            Self::Status {
                url,
                status,
                preview,
            } => write!(f, "{url}: upstream status {status}; body preview: {preview}"),
            Self::RateLimited { url } => write!(f, "{url}: still rate limited after retries"),
            Self::Decode { url, message } => write!(f, "{url}: failed to decode body: {message}"),
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Hard limit for a single attempt.
    pub timeout: Duration,
    /// Retries after failures other than 429; total attempts is one more.
    pub max_retries: u32,
    /// Separate budget for 429 responses.
    pub max_rate_limit_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            max_retries: DEFAULT_FETCH_MAX_RETRIES,
            max_rate_limit_retries: DEFAULT_FETCH_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_FETCH_BASE_DELAY_MS),
        }
    }
}

impl From<&SyncConfig> for RetryPolicy {
    fn from(config: &SyncConfig) -> Self {
        Self {
            timeout: config.fetch_timeout,
            max_retries: config.fetch_max_retries,
            max_rate_limit_retries: config.fetch_max_retries.max(1),
            base_delay: config.fetch_base_delay,
        }
    }
}

impl RetryPolicy {
    /// `base * 2^failures`, saturating.
    pub fn backoff_delay(&self, failures: u32) -> Duration {
        let factor = 1u32.checked_shl(failures).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// `base * (attempt + 1)`, raised to the server's `Retry-After` if larger.
    pub fn rate_limit_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let linear = self.base_delay.saturating_mul(attempt.saturating_add(1));
        retry_after.map_or(linear, |hint| hint.max(linear))
    }
}

/// GET with per-attempt timeout, exponential backoff and 429 handling.
pub struct ResilientFetchClient {
    transport: Arc<dyn HttpTransport>,
    headers: Vec<(&'static str, String)>,
    policy: RetryPolicy,
}

impl ResilientFetchClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        api_key: Option<String>,
        policy: RetryPolicy,
    ) -> Self {
        let headers = api_key
            .map(|key| vec![(API_KEY_HEADER, key)])
            .unwrap_or_default();
        Self {
            transport,
            headers,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        self.fetch_json_with(url, &self.policy).await
    }

    /// Like [`fetch_json`](Self::fetch_json) with a per-call timeout and retry budget.
    pub async fn fetch_json_with<T: DeserializeOwned>(
        &self,
        url: &str,
        policy: &RetryPolicy,
    ) -> Result<T, FetchError> {
        let body = self.fetch_bytes_with(url, policy).await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: format!("{e}; body preview: {}", preview(&body)),
        })
    }

    pub async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
        self.fetch_bytes_with(url, &self.policy).await
    }

    pub async fn fetch_bytes_with(
        &self,
        url: &str,
        policy: &RetryPolicy,
    ) -> Result<Bytes, FetchError> {
        let mut attempt: u32 = 0;
        let mut failures: u32 = 0;
        let mut rate_limited: u32 = 0;

        loop {
            let outcome =
                tokio::time::timeout(policy.timeout, self.transport.get(url, &self.headers)).await;

            let error = match outcome {
                Ok(Ok(resp)) if resp.is_success() => {
                    debug!(url, attempt, "fetch succeeded");
                    return Ok(resp.body);
                }
                Ok(Ok(resp)) if resp.status == 429 => {
                    if rate_limited >= policy.max_rate_limit_retries {
                        return Err(FetchError::RateLimited {
                            url: url.to_string(),
                        });
                    }
                    let delay = policy.rate_limit_delay(attempt, resp.retry_after);
                    rate_limited += 1;
                    attempt += 1;
                    warn!(
                        url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "rate limited, waiting before retry"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Ok(Ok(resp)) => FetchError::Status {
                    url: url.to_string(),
                    status: resp.status,
                    preview: preview(&resp.body),
                },
                Ok(Err(message)) => FetchError::Transport {
                    url: url.to_string(),
                    message,
                },
                Err(_) => FetchError::Timeout {
                    url: url.to_string(),
                    after: policy.timeout,
                },
            };

            if failures >= policy.max_retries {
                warn!(url, attempts = attempt + 1, error = %error, "giving up after retries");
                return Err(error);
            }
            let delay = policy.backoff_delay(failures);
            failures += 1;
            attempt += 1;
            warn!(
                url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "fetch failed, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn preview(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(BODY_PREVIEW_CHARS)
        .collect()
}
