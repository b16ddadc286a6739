//! Single-resource retrieval
//!
//! The HTTP layer sits behind the [`Fetcher`] trait so the orchestrator can be
//! driven by any byte source. [`HttpFetcher`] is the production implementation
//! built on `reqwest`.

use crate::error::{Error, FetchError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Filename used when a URL has no usable final path segment
pub const DEFAULT_FILENAME: &str = "image.jpg";

/// Bytes retrieved from one URL
#[derive(Clone, Debug)]
pub struct FetchedResource {
    /// The URL that was requested
    pub url: String,
    /// Base filename derived from the URL
    pub filename: String,
    /// Full response body
    pub bytes: Vec<u8>,
}

/// Capability to fetch the full body behind a URL
///
/// Implementations must report every failure as a [`FetchError`] and never
/// panic; callers treat one failed fetch as one missing item.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve the resource at `url`
    async fn fetch(&self, url: &str) -> std::result::Result<FetchedResource, FetchError>;

    /// Short name for logging
    fn name(&self) -> &'static str;
}

/// Derive a base filename from the last path segment of a URL
///
/// Percent-escapes are decoded; anything that is empty or not a plain file
/// name after decoding falls back to [`DEFAULT_FILENAME`].
pub fn filename_from_url(url: &str) -> String {
    let segment = url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .unwrap_or_default();

    let decoded = urlencoding::decode(&segment)
        .map(|s| s.into_owned())
        .unwrap_or(segment);

    if crate::utils::is_plain_filename(&decoded) {
        decoded
    } else {
        DEFAULT_FILENAME.to_string()
    }
}

/// Reject anything that is not an absolute http(s) URL
pub fn validate_http_url(url: &str) -> std::result::Result<url::Url, FetchError> {
    let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", scheme),
        }),
    }
}

/// `reqwest`-backed fetcher with a per-request timeout
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a client with the given timeout and User-Agent
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Other(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client, timeout })
    }

    fn classify(&self, url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                seconds: self.timeout.as_secs(),
            }
        } else {
            FetchError::Connection {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<FetchedResource, FetchError> {
        let parsed = validate_http_url(url)?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                self.classify(url, e)
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        tracing::debug!(url = %url, bytes = bytes.len(), "fetched resource");

        Ok(FetchedResource {
            url: url.to_string(),
            filename: filename_from_url(url),
            bytes: bytes.to_vec(),
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
