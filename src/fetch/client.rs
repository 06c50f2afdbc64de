//! Dual-strategy fetch client
//!
//! This module handles all document fetches, including:
//! - Building the HTTP client with browser-like headers
//! - Lightweight GET requests with rate-limit aware retries
//! - Browser renders through a session-scoped headless Chromium
//! - Error classification into the fetch taxonomy

use crate::config::FetchConfig;
use crate::fetch::browser::BrowserSession;
use crate::fetch::{Fetch, FetchError, FetchOptions, FetchResult, FetchStrategy, RetryPolicy};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed (up to 10 hops) and both HTTP and HTTPS are
/// accepted. Certificates are verified.
///
/// # Example
///
/// ```no_run
/// use linkscape::config::FetchConfig;
/// use linkscape::fetch::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production [`Fetch`] implementation
///
/// The browser is not started until `open_session(FetchStrategy::Browser)`
/// is called and is shut down by the matching `close_session`.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
    retry: RetryPolicy,
    browser: RwLock<Option<Arc<BrowserSession>>>,
}

impl FetchClient {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: build_http_client(config)?,
            config: config.clone(),
            retry: RetryPolicy::from_config(config),
            browser: RwLock::new(None),
        })
    }

    async fn fetch_lightweight(&self, url: &str) -> FetchResult {
        let (result, attempts) = self.retry.run(url, || self.get_once(url)).await;

        match result {
            Ok(body) => {
                info!("Fetched {} ({} bytes)", url, body.len());
                FetchResult::success(url, FetchStrategy::Lightweight, body, attempts)
            }
            Err(error) => {
                warn!("Failed to fetch {}: {}", url, error);
                FetchResult::failure(url, FetchStrategy::Lightweight, error, attempts)
            }
        }
    }

    async fn get_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        match status {
            200 => response.text().await.map_err(classify_reqwest_error),
            429 | 503 => Err(FetchError::RateLimited(status)),
            _ => Err(FetchError::HttpStatus(status)),
        }
    }

    async fn fetch_browser(&self, url: &str, options: &FetchOptions) -> FetchResult {
        let Some(session) = self.browser.read().await.clone() else {
            return FetchResult::failure(
                url,
                FetchStrategy::Browser,
                FetchError::Render("browser session is not open".to_string()),
                0,
            );
        };

        let settle = Duration::from_millis(self.config.browser_settle_ms);
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let screenshot = options.screenshot_path.as_deref();

        let (result, attempts) = self
            .retry
            .run(url, || session.render(url, settle, timeout, screenshot))
            .await;

        match result {
            Ok(page) => {
                info!("Rendered {} ({} bytes)", url, page.html.len());
                let mut fetched =
                    FetchResult::success(url, FetchStrategy::Browser, page.html, attempts);
                fetched.screenshot_path = page.screenshot_path;
                fetched
            }
            Err(error) => {
                warn!("Failed to render {}: {}", url, error);
                FetchResult::failure(url, FetchStrategy::Browser, error, attempts)
            }
        }
    }
}

#[async_trait]
impl Fetch for FetchClient {
    async fn fetch(&self, url: &str, strategy: FetchStrategy, options: &FetchOptions) -> FetchResult {
        match strategy {
            FetchStrategy::Lightweight => self.fetch_lightweight(url).await,
            FetchStrategy::Browser => self.fetch_browser(url, options).await,
        }
    }

    async fn open_session(&self, strategy: FetchStrategy) -> Result<(), FetchError> {
        if strategy != FetchStrategy::Browser {
            return Ok(());
        }

        let mut slot = self.browser.write().await;
        if slot.is_none() {
            let session =
                BrowserSession::launch(Duration::from_secs(self.config.timeout_secs)).await?;
            *slot = Some(Arc::new(session));
        }
        Ok(())
    }

    async fn close_session(&self, strategy: FetchStrategy) {
        if strategy != FetchStrategy::Browser {
            return;
        }

        let Some(session) = self.browser.write().await.take() else {
            return;
        };

        match Arc::try_unwrap(session) {
            Ok(session) => session.close().await,
            Err(shared) => {
                // Outstanding renders hold clones; the last one to finish drops the browser
                debug!("Browser session still referenced, releasing on last drop");
                drop(shared);
            }
        }
    }
}

/// Maps a reqwest failure onto the fetch taxonomy
fn classify_reqwest_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(error.to_string())
    }
}
