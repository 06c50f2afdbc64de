//! Fetch module for Linkscape
//!
//! Two interchangeable strategies sit behind the [`Fetch`] trait:
//! - **Lightweight**: a plain HTTP GET through `reqwest`
//! - **Browser**: a headless Chromium render through `chromiumoxide`
//!
//! The strategy is chosen per call. Retries happen inside a single `fetch`
//! call; the returned [`FetchResult`] records how many attempts were made
//! and, on failure, the last error.

mod browser;
mod client;
#[cfg(test)]
pub(crate) mod mock;
mod retry;

pub use browser::BrowserSession;
pub use client::{build_http_client, FetchClient};
pub use retry::RetryPolicy;

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fetch strategy selected at call time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStrategy {
    /// Plain HTTP GET
    Lightweight,
    /// Headless browser render
    Browser,
}

impl FetchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lightweight => "lightweight",
            Self::Browser => "browser",
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call fetch options
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Where to save a full-page screenshot (browser strategy only)
    pub screenshot_path: Option<PathBuf>,
}

impl FetchOptions {
    pub fn with_screenshot(path: PathBuf) -> Self {
        Self {
            screenshot_path: Some(path),
        }
    }
}

/// Fetch failure taxonomy
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Connection-level failure
    #[error("network error: {0}")]
    Network(String),

    /// The request or render exceeded its timeout
    #[error("request timed out")]
    Timeout,

    /// HTTP 429 or 503
    #[error("rate limited (HTTP {0})")]
    RateLimited(u16),

    /// Any other non-200 status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Browser engine failure
    #[error("render error: {0}")]
    Render(String),
}

impl FetchError {
    /// Returns true if another attempt may succeed
    ///
    /// Only terminal HTTP statuses are never retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::HttpStatus(_))
    }
}

/// Coarse outcome of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Success,
    RateLimited,
    Timeout,
    Network,
    HttpError,
    RenderError,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of a single `fetch` call, after retries
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The requested URL
    pub url: String,
    /// Strategy that produced this result
    pub strategy: FetchStrategy,
    /// Document body on success
    pub body: Option<String>,
    /// Last error on failure
    pub error: Option<FetchError>,
    /// Screenshot written for this fetch, if any
    pub screenshot_path: Option<PathBuf>,
    /// Number of attempts made (1 = no retries)
    pub attempts: u32,
}

impl FetchResult {
    pub fn success(url: &str, strategy: FetchStrategy, body: String, attempts: u32) -> Self {
        Self {
            url: url.to_string(),
            strategy,
            body: Some(body),
            error: None,
            screenshot_path: None,
            attempts,
        }
    }

    pub fn failure(url: &str, strategy: FetchStrategy, error: FetchError, attempts: u32) -> Self {
        Self {
            url: url.to_string(),
            strategy,
            body: None,
            error: Some(error),
            screenshot_path: None,
            attempts,
        }
    }

    pub fn outcome(&self) -> FetchOutcome {
        match (&self.error, &self.body) {
            (None, Some(_)) => FetchOutcome::Success,
            (Some(FetchError::RateLimited(_)), _) => FetchOutcome::RateLimited,
            (Some(FetchError::Timeout), _) => FetchOutcome::Timeout,
            (Some(FetchError::HttpStatus(_)), _) => FetchOutcome::HttpError,
            (Some(FetchError::Render(_)), _) => FetchOutcome::RenderError,
            (Some(FetchError::Network(_)), _) | (None, None) => FetchOutcome::Network,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome().is_success()
    }

    /// Human-readable failure description
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(e) => format!("Failed to fetch page: {}", e),
            None if self.body.is_none() => "Failed to fetch page".to_string(),
            None => String::new(),
        }
    }
}

/// Fetches documents with a selectable strategy
///
/// Implementations must never panic on network input and must turn every
/// failure into a [`FetchResult`] with `error` set.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches `url`, retrying retryable failures within the configured budget
    async fn fetch(&self, url: &str, strategy: FetchStrategy, options: &FetchOptions)
        -> FetchResult;

    /// Acquires the session-scoped resources for a strategy
    async fn open_session(&self, _strategy: FetchStrategy) -> Result<(), FetchError> {
        Ok(())
    }

    /// Releases the resources acquired by `open_session`
    async fn close_session(&self, _strategy: FetchStrategy) {}
}
