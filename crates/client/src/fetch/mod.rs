//! HTTP retrieval of the page to extract.
//!
//! ### Request
//! - A single `GET` with no extra headers (a User-Agent only when configured).
//! - Max redirects: 10 (configurable)
//! - Timeout: 20s (configurable)
//! - Max body bytes: 5MB (configurable)
//!
//! ### Failures
//! - Non-2xx statuses are rejected unless `accept_error_status` is set.
//! - Transport errors, timeouts and 5xx responses may be retried with
//!   exponential backoff when `retries > 0`. The default is one attempt.
//! - A [`CancellationToken`] can abort the retrieval at any point.
//!
//! ### Decoding
//! - The body is decoded as text using the declared or detected charset,
//!   regardless of the declared content type.

pub mod decode;
pub mod url;

use bytes::{Bytes, BytesMut};
use reqwest::Url;
use reqwest::{Client, StatusCode, header};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

pub use decode::decode_body;
pub use self::url::{UrlError, parse_target};

use scrapbook_core::{AppConfig, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: none)
    pub user_agent: Option<String>,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 10)
    pub max_redirects: usize,

    /// Additional attempts after a retryable failure (default: 0)
    pub retries: u32,

    /// Base delay for exponential backoff (default: 200ms)
    pub retry_backoff: Duration,

    /// Treat non-2xx responses as documents instead of errors (default: false)
    pub accept_error_status: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 10,
            retries: 0,
            retry_backoff: Duration::from_millis(200),
            accept_error_status: false,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
            retries: config.retries,
            retry_backoff: config.retry_backoff(),
            accept_error_status: config.accept_error_status,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds, across all attempts
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Decode the body as text using the declared or detected charset.
    pub fn text(&self) -> String {
        decode_body(&self.bytes, self.content_type.as_deref())
    }
}

/// HTTP fetch client.
///
/// Holds no per-request state; one client may serve concurrent fetches.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let http = builder
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL, returning raw bytes and metadata.
    ///
    /// Retries retryable failures up to `config.retries` times.
    pub async fn fetch(&self, url_str: &str) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = parse_target(url_str).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(&url).await {
                Ok(mut response) => {
                    response.fetch_ms = start.elapsed().as_millis() as u64;
                    tracing::debug!(
                        "fetched {} -> {} in {}ms ({} bytes, status {})",
                        response.url,
                        response.final_url,
                        response.fetch_ms,
                        response.bytes.len(),
                        response.status.as_u16()
                    );
                    return Ok(response);
                }
                Err(err) if err.is_retryable() && attempt < self.config.retries => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        url = %url,
                        attempt,
                        backoff_ms = delay.as_millis() as u64,
                        error = %err,
                        "fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::debug!(url = %url, attempts = attempt + 1, error = %err, "fetch failed");
                    return Err(err);
                }
            }
        }
    }

    /// Fetch a URL, aborting with [`Error::Cancelled`] as soon as `cancel` fires.
    pub async fn fetch_with_cancel(&self, url_str: &str, cancel: &CancellationToken) -> Result<FetchResponse, Error> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled(format!("fetch of {} cancelled", url_str.trim()))),
            result = self.fetch(url_str) => result,
        }
    }

    /// Perform a single request without retries.
    async fn fetch_once(&self, url: &Url) -> Result<FetchResponse, Error> {
        let mut response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.classify(url, &e, "network error"))?;

        let status = response.status();

        if !status.is_success() && !self.config.accept_error_status {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        // Content-Length may be absent (chunked), so the cap is enforced while reading.
        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.classify(url, &e, "failed to read response"))?
        {
            if body.len() + chunk.len() > self.config.max_bytes {
                return Err(Error::FetchTooLarge(format!(
                    "more than {} bytes (limit {})",
                    body.len() + chunk.len(),
                    self.config.max_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(FetchResponse { url: url.clone(), final_url, status, content_type, bytes: body.freeze(), fetch_ms: 0 })
    }

    /// Map a reqwest failure to an error, separating failures a retry can fix
    /// (connect, request transport, body transport) from ones it cannot
    /// (redirect limit, TLS handshake, request building, decoding).
    fn classify(&self, url: &Url, e: &reqwest::Error, context: &str) -> Error {
        if e.is_timeout() {
            Error::FetchTimeout(format!("{} after {}ms", url, self.config.timeout.as_millis()))
        } else if e.is_redirect() {
            Error::RedirectFailed(format!("{}: {}", context, e))
        } else if is_tls_failure(e) {
            Error::RequestFailed(format!("{}: {}", context, e))
        } else if e.is_connect() || e.is_request() || e.is_body() {
            Error::HttpError(format!("{}: {}", context, e))
        } else {
            Error::RequestFailed(format!("{}: {}", context, e))
        }
    }

    /// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`.
    fn backoff(&self, attempt: u32) -> Duration {
        self.config
            .retry_backoff
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

/// rustls reports handshake and certificate failures as `InvalidData` I/O errors.
fn is_tls_failure(e: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(e);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>()
            && io.kind() == std::io::ErrorKind::InvalidData
        {
            return true;
        }
        source = err.source();
    }
    false
}
