//! Headless browser session
//!
//! A [`BrowserSession`] owns one Chromium process and the task that drives
//! its CDP event stream. Each fetch opens a fresh tab so concurrent renders
//! never share page state.

use crate::fetch::FetchError;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A rendered page
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    /// Set only when the screenshot was written successfully
    pub screenshot_path: Option<PathBuf>,
}

/// A running headless browser
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    /// Launches a headless Chromium instance
    pub async fn launch(request_timeout: Duration) -> Result<Self, FetchError> {
        let config = BrowserConfig::builder()
            .window_size(1280, 800)
            .request_timeout(request_timeout)
            .build()
            .map_err(FetchError::Render)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Render(format!("failed to launch browser: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        info!("Browser session started");
        Ok(Self { browser, handler })
    }

    /// Renders `url` in a new tab and returns the final document
    ///
    /// The whole render (navigation, settle wait, screenshot, read) is bounded
    /// by `timeout`. The tab is closed on every path.
    pub async fn render(
        &self,
        url: &str,
        settle: Duration,
        timeout: Duration,
        screenshot_path: Option<&Path>,
    ) -> Result<RenderedPage, FetchError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Render(e.to_string()))?;

        let result = match tokio::time::timeout(
            timeout,
            load_page(&page, url, settle, screenshot_path),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        };

        if let Err(e) = page.close().await {
            debug!("Failed to close tab for {}: {}", url, e);
        }

        result
    }

    /// Shuts the browser down and waits for the process to exit
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();
        info!("Browser session closed");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

async fn load_page(
    page: &Page,
    url: &str,
    settle: Duration,
    screenshot_path: Option<&Path>,
) -> Result<RenderedPage, FetchError> {
    page.goto(url)
        .await
        .map_err(|e| FetchError::Render(format!("navigation failed: {}", e)))?;
    page.wait_for_navigation()
        .await
        .map_err(|e| FetchError::Render(format!("page load failed: {}", e)))?;

    // Late XHR-driven content
    tokio::time::sleep(settle).await;

    let screenshot_path = match screenshot_path {
        Some(path) => capture_screenshot(page, url, path).await,
        None => None,
    };

    let html = page
        .content()
        .await
        .map_err(|e| FetchError::Render(e.to_string()))?;

    Ok(RenderedPage {
        html,
        screenshot_path,
    })
}

/// Captures a full-page screenshot; failures are logged and swallowed
async fn capture_screenshot(page: &Page, url: &str, path: &Path) -> Option<PathBuf> {
    if let Some(parent) = path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            warn!("Failed to create screenshot directory for {}: {}", url, e);
            return None;
        }
    }

    let params = ScreenshotParams::builder().full_page(true).build();
    match page.save_screenshot(params, path).await {
        Ok(_) => {
            debug!("Saved screenshot for {} to {}", url, path.display());
            Some(path.to_path_buf())
        }
        Err(e) => {
            warn!("Failed to capture screenshot for {}: {}", url, e);
            None
        }
    }
}
