//! Sitemap module for Linkscape
//!
//! This module turns a site into its list of content URLs:
//! - Discovery of the sitemap location ([`SitemapResolver`])
//! - Sequential, cycle-safe expansion of sitemap indexes ([`SitemapTraverser`])
//! - Two-phase filtering with a permissive fallback ([`FilterPatterns`])
//! - Site-level crawls, including the manual XML override ([`SitemapCrawler`])

mod document;
mod filter;
mod resolver;
mod traverser;

pub use document::{is_sitemap_body, parse_sitemap, SitemapDocument, SitemapKind};
pub use filter::FilterPatterns;
pub use resolver::SitemapResolver;
pub use traverser::{NodeFailure, SitemapExpansion, SitemapNode, SitemapTraverser, SitemapWalk};

use crate::config::SitemapConfig;
use crate::fetch::{Fetch, FetchStrategy};
use crate::url::{join_root, site_root};
use crate::{ConfigError, LinkscapeError};
use futures::future::join_all;
use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// A site to run the sitemap phase for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRequest {
    /// Site URL or bare host
    pub url: String,
    /// Known sitemap URL; skips discovery
    pub sitemap: Option<String>,
    /// Pasted sitemap document; skips all network access
    pub manual_xml: Option<String>,
}

impl SiteRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            sitemap: None,
            manual_xml: None,
        }
    }

    pub fn with_sitemap(mut self, sitemap: impl Into<String>) -> Self {
        self.sitemap = Some(sitemap.into());
        self
    }

    pub fn with_manual_xml(mut self, xml: impl Into<String>) -> Self {
        self.manual_xml = Some(xml.into());
        self
    }
}

/// Sitemap phase status for one site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStatus {
    Success,
    NoSitemap,
    Error,
}

impl CrawlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoSitemap => "no_sitemap",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the sitemap phase for one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub status: CrawlStatus,
    pub sitemap_url: Option<String>,
    /// Filtered, deduplicated content URLs
    pub urls: Vec<String>,
    pub message: String,
    /// Nested sitemaps found in a pasted index (never fetched)
    pub nested_sitemaps: Vec<String>,
}

impl CrawlOutcome {
    pub fn success(sitemap_url: String, urls: Vec<String>, message: String) -> Self {
        Self {
            status: CrawlStatus::Success,
            sitemap_url: Some(sitemap_url),
            urls,
            message,
            nested_sitemaps: Vec::new(),
        }
    }

    pub fn no_sitemap() -> Self {
        Self {
            status: CrawlStatus::NoSitemap,
            sitemap_url: None,
            urls: Vec::new(),
            message: "No sitemap found".to_string(),
            nested_sitemaps: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CrawlStatus::Error,
            sitemap_url: None,
            urls: Vec::new(),
            message: message.into(),
            nested_sitemaps: Vec::new(),
        }
    }

    pub fn total_urls(&self) -> usize {
        self.urls.len()
    }
}

/// Runs the sitemap phase for one or many sites
pub struct SitemapCrawler {
    fetcher: Arc<dyn Fetch>,
    strategy: FetchStrategy,
    resolver: SitemapResolver,
    traverser: SitemapTraverser,
    filters: FilterPatterns,
    custom_patterns: Vec<String>,
}

impl SitemapCrawler {
    pub fn new(fetcher: Arc<dyn Fetch>, config: &SitemapConfig) -> Result<Self, ConfigError> {
        let strategy = if config.use_browser {
            FetchStrategy::Browser
        } else {
            FetchStrategy::Lightweight
        };

        Ok(Self {
            resolver: SitemapResolver::new(fetcher.clone(), strategy, config.patterns.clone()),
            traverser: SitemapTraverser::new(
                fetcher.clone(),
                strategy,
                Duration::from_millis(config.request_delay_ms),
            ),
            filters: FilterPatterns::from_config(config)?,
            custom_patterns: config.custom_patterns.clone(),
            fetcher,
            strategy,
        })
    }

    /// Runs the sitemap phase for one site
    ///
    /// Never fails: errors and panics are reported as `CrawlStatus::Error`.
    pub async fn crawl_site(&self, request: &SiteRequest) -> CrawlOutcome {
        match AssertUnwindSafe(self.crawl_site_inner(request))
            .catch_unwind()
            .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!("Error crawling sitemap for {}: {}", request.url, e);
                CrawlOutcome::error(format!("Error: {}", e))
            }
            Err(_) => {
                error!("Sitemap crawl for {} panicked", request.url);
                CrawlOutcome::error("Error: sitemap crawl panicked")
            }
        }
    }

    async fn crawl_site_inner(&self, request: &SiteRequest) -> Result<CrawlOutcome, LinkscapeError> {
        if let Some(xml) = &request.manual_xml {
            return self.crawl_manual(request, xml);
        }

        let sitemap_url = match &request.sitemap {
            Some(url) => url.clone(),
            None => match self
                .resolver
                .discover(&request.url, &self.custom_patterns)
                .await?
            {
                Some(url) => url,
                None => return Ok(CrawlOutcome::no_sitemap()),
            },
        };

        let expansion = self.traverser.expand(&sitemap_url, &self.filters).await;
        if let Some(failure) = expansion.walk.failure_for(&sitemap_url) {
            return Ok(CrawlOutcome::error(format!(
                "Failed to fetch sitemap {}: {}",
                sitemap_url, failure.message
            )));
        }

        let message = format!("Successfully extracted {} post URLs", expansion.urls.len());
        Ok(CrawlOutcome::success(sitemap_url, expansion.urls, message))
    }

    /// Manual override: parse pasted XML, never touch the network
    fn crawl_manual(&self, request: &SiteRequest, xml: &str) -> Result<CrawlOutcome, LinkscapeError> {
        info!("Using manually supplied sitemap XML for {}", request.url);
        let sitemap_url = match &request.sitemap {
            Some(url) => url.clone(),
            None => join_root(&site_root(&request.url)?, "/sitemap.xml"),
        };

        let node = SitemapNode::from_body(&sitemap_url, xml);
        if node.kind == SitemapKind::Index {
            warn!(
                "Manual XML is a sitemap index with {} nested sitemaps; supply each one separately",
                node.children.len()
            );
            let message = format!(
                "Manual XML is a sitemap index with {} nested sitemaps; supply each one separately",
                node.children.len()
            );
            let mut outcome = CrawlOutcome::success(sitemap_url, Vec::new(), message);
            outcome.nested_sitemaps = node.children;
            return Ok(outcome);
        }

        info!("Extracted {} URLs from manual XML", node.leaf_urls.len());
        let urls = self.filters.apply(&node.leaf_urls);
        let message = format!(
            "Successfully extracted {} post URLs from manual XML",
            urls.len()
        );
        Ok(CrawlOutcome::success(sitemap_url, urls, message))
    }

    /// Runs the sitemap phase for many sites
    ///
    /// Sites are crawled concurrently, at most `concurrency` at a time; each
    /// site's own traversal stays sequential. When the browser strategy is
    /// configured, one browser session is shared by all sites and released
    /// before returning. Results are in input order.
    pub async fn crawl_sites(&self, sites: &[SiteRequest], concurrency: usize) -> Vec<CrawlOutcome> {
        if sites.is_empty() {
            return Vec::new();
        }

        let needs_session = sites.iter().any(|s| s.manual_xml.is_none());
        if needs_session {
            if let Err(e) = self.fetcher.open_session(self.strategy).await {
                error!("Failed to start {} session: {}", self.strategy, e);
                let message = format!("Error: failed to start {} session: {}", self.strategy, e);
                let mut outcomes = Vec::with_capacity(sites.len());
                for site in sites {
                    outcomes.push(match site.manual_xml {
                        Some(_) => self.crawl_site(site).await,
                        None => CrawlOutcome::error(message.clone()),
                    });
                }
                return outcomes;
            }
        }

        let semaphore = Semaphore::new(concurrency.max(1));
        let outcomes = join_all(sites.iter().map(|site| {
            let semaphore = &semaphore;
            async move {
                let _permit = semaphore.acquire().await;
                let outcome = self.crawl_site(site).await;
                info!(
                    "Sitemap phase for {}: {} ({} URLs)",
                    site.url,
                    outcome.status,
                    outcome.total_urls()
                );
                outcome
            }
        }))
        .await;

        if needs_session {
            self.fetcher.close_session(self.strategy).await;
        }

        outcomes
    }
}
