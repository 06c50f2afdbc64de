//! Extraction coordinator
//!
//! Drives fetch and link extraction over a batch of page URLs, then
//! re-fetches failed or link-less pages through the browser strategy.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::{PageLinks, ProgressCallback};
use crate::extract::PageExtractor;
use crate::fetch::{Fetch, FetchOptions, FetchStrategy};
use crate::ConfigError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Longest file stem used for a screenshot
const MAX_SCREENSHOT_STEM: usize = 150;

/// Concurrency of the browser pass: half the lightweight limit, between 1 and `cap`
pub fn escalation_concurrency(concurrency: usize, cap: usize) -> usize {
    (concurrency / 2).clamp(1, cap.max(1))
}

/// File name for the screenshot of `url`
///
/// The scheme is dropped and every character other than ASCII letters,
/// digits, `-` and `.` becomes `_`.
pub fn screenshot_file_name(url: &str) -> String {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let stem: String = without_scheme
        .trim_end_matches('/')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_SCREENSHOT_STEM)
        .collect();
    format!("{}.png", stem)
}

/// Main extraction coordinator
pub struct Orchestrator {
    fetcher: Arc<dyn Fetch>,
    extractor: Arc<PageExtractor>,
    concurrency: usize,
    browser_concurrency_cap: usize,
    escalate: bool,
    screenshot_dir: Option<PathBuf>,
    progress: Option<ProgressCallback>,
}

impl Orchestrator {
    pub fn new(fetcher: Arc<dyn Fetch>, extractor: PageExtractor, config: &CrawlerConfig) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(extractor),
            concurrency: config.concurrency.max(1) as usize,
            browser_concurrency_cap: config.browser_concurrency_cap.max(1) as usize,
            escalate: config.escalate,
            screenshot_dir: None,
            progress: None,
        }
    }

    /// Builds an orchestrator from the `[links]`, `[crawler]` and `[fetch]` sections
    pub fn from_config(fetcher: Arc<dyn Fetch>, config: &Config) -> Result<Self, ConfigError> {
        let extractor = PageExtractor::from_config(&config.links)?;
        let mut orchestrator = Self::new(fetcher, extractor, &config.crawler);
        if let Some(dir) = &config.fetch.screenshot_dir {
            orchestrator = orchestrator.with_screenshot_dir(dir);
        }
        Ok(orchestrator)
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = Some(dir.into());
        self
    }

    pub fn with_escalation(mut self, escalate: bool) -> Self {
        self.escalate = escalate;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs a single pass over `urls` with one strategy
    ///
    /// The browser session, when needed, is opened before the pass and
    /// released after it. If it cannot be opened every page fails.
    pub async fn extract_links(&self, urls: &[String], strategy: FetchStrategy) -> Vec<PageLinks> {
        if urls.is_empty() {
            return Vec::new();
        }

        if let Err(e) = self.fetcher.open_session(strategy).await {
            error!("Failed to start {} session: {}", strategy, e);
            let message = format!("Error: failed to start {} session: {}", strategy, e);
            return urls
                .iter()
                .map(|url| PageLinks::error(url, strategy, message.clone()))
                .collect();
        }

        let results = self.run_pass(urls, strategy, self.concurrency).await;
        self.fetcher.close_session(strategy).await;
        results
    }

    /// Extracts links from every URL, escalating failures to the browser
    ///
    /// 1. Lightweight pass over the whole batch
    /// 2. Pages with an error or zero links are re-fetched with the browser
    ///    strategy at reduced concurrency
    /// 3. Browser results replace the matching lightweight results
    ///
    /// Returns one result per distinct URL, in first-seen order.
    pub async fn extract_with_escalation(&self, urls: &[String]) -> Vec<PageLinks> {
        info!("Extracting links from {} pages", urls.len());
        let mut results = self
            .run_pass(urls, FetchStrategy::Lightweight, self.concurrency)
            .await;

        if !self.escalate {
            return results;
        }

        let pending: Vec<String> = results
            .iter()
            .filter(|page| page.needs_escalation())
            .map(|page| page.url.clone())
            .collect();

        if pending.is_empty() {
            debug!("No pages need browser rendering");
            return results;
        }

        let concurrency = escalation_concurrency(self.concurrency, self.browser_concurrency_cap);
        info!(
            "Retrying {} failed or empty pages with browser rendering (concurrency {})",
            pending.len(),
            concurrency
        );

        if let Err(e) = self.fetcher.open_session(FetchStrategy::Browser).await {
            warn!(
                "Browser unavailable, keeping lightweight results for {} pages: {}",
                pending.len(),
                e
            );
            return results;
        }

        let rendered = self
            .run_pass(&pending, FetchStrategy::Browser, concurrency)
            .await;
        self.fetcher.close_session(FetchStrategy::Browser).await;

        let mut rendered: HashMap<String, PageLinks> = rendered
            .into_iter()
            .map(|page| (page.url.clone(), page))
            .collect();
        let mut recovered = 0;
        for slot in results.iter_mut() {
            if let Some(page) = rendered.remove(&slot.url) {
                if !page.needs_escalation() {
                    recovered += 1;
                }
                *slot = page;
            }
        }

        info!(
            "Browser rendering recovered {} of {} pages",
            recovered,
            pending.len()
        );
        results
    }

    async fn run_pass(&self, urls: &[String], strategy: FetchStrategy, concurrency: usize) -> Vec<PageLinks> {
        let scheduler = Scheduler::new(concurrency).with_progress(self.progress.clone());
        scheduler
            .run(urls, strategy, |url| {
                let options = self.options_for(&url, strategy);
                process_page(
                    self.fetcher.clone(),
                    self.extractor.clone(),
                    url,
                    strategy,
                    options,
                )
            })
            .await
    }

    fn options_for(&self, url: &str, strategy: FetchStrategy) -> FetchOptions {
        match (&self.screenshot_dir, strategy) {
            (Some(dir), FetchStrategy::Browser) => {
                FetchOptions::with_screenshot(dir.join(screenshot_file_name(url)))
            }
            _ => FetchOptions::default(),
        }
    }
}

/// Fetches one page and extracts its links
async fn process_page(
    fetcher: Arc<dyn Fetch>,
    extractor: Arc<PageExtractor>,
    url: String,
    strategy: FetchStrategy,
    options: FetchOptions,
) -> PageLinks {
    let fetched = fetcher.fetch(&url, strategy, &options).await;

    let Some(body) = fetched.body.as_deref() else {
        let message = fetched.error_message();
        error!("Error extracting links from {}: {}", url, message);
        return PageLinks::error(&url, strategy, message);
    };

    let mut page = match extractor.extract(body, &url) {
        Ok(links) => {
            debug!("Extracted {} links from {} ({})", links.len(), url, strategy);
            PageLinks::success(&url, strategy, links)
        }
        Err(e) => {
            error!("Error extracting links from {}: {}", url, e);
            PageLinks::error(&url, strategy, format!("Error: {}", e))
        }
    };
    page.screenshot_path = fetched.screenshot_path;
    page
}
