use crate::fetch::{Fetch, FetchOptions, FetchStrategy};
use crate::sitemap::document::{parse_sitemap, SitemapKind};
use crate::sitemap::filter::FilterPatterns;
use crate::url::upgrade_scheme;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// A fetched sitemap document
///
/// Only lives for the duration of one walk.
#[derive(Debug, Clone)]
pub struct SitemapNode {
    pub url: String,
    pub kind: SitemapKind,
    /// Nested sitemap URLs (index only)
    pub children: Vec<String>,
    /// Page URLs (urlset only)
    pub leaf_urls: Vec<String>,
}

impl SitemapNode {
    /// Builds a node from a document body, upgrading every URL to HTTPS
    pub fn from_body(url: &str, body: &str) -> Self {
        let doc = parse_sitemap(body);
        let locations: Vec<String> = doc.locations.iter().map(|u| upgrade_scheme(u)).collect();

        match doc.kind {
            SitemapKind::Index => Self {
                url: url.to_string(),
                kind: doc.kind,
                children: locations,
                leaf_urls: Vec::new(),
            },
            SitemapKind::UrlSet => Self {
                url: url.to_string(),
                kind: doc.kind,
                children: Vec::new(),
                leaf_urls: locations,
            },
        }
    }
}

/// A sitemap node that could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    pub url: String,
    pub message: String,
}

/// Everything collected by one walk, before filtering
#[derive(Debug, Clone, Default)]
pub struct SitemapWalk {
    /// Leaf URLs in discovery order, duplicates included
    pub leaf_urls: Vec<String>,
    /// Sitemap URLs fetched, in visit order
    pub visited: Vec<String>,
    pub failures: Vec<NodeFailure>,
}

impl SitemapWalk {
    /// Returns the failure recorded for `url`, if any
    pub fn failure_for(&self, url: &str) -> Option<&NodeFailure> {
        self.failures.iter().find(|f| f.url == url)
    }
}

/// Result of [`SitemapTraverser::expand`]
#[derive(Debug, Clone, Default)]
pub struct SitemapExpansion {
    /// Filtered, deduplicated content URLs
    pub urls: Vec<String>,
    /// The raw walk the URLs were taken from
    pub walk: SitemapWalk,
}

/// Expands a sitemap tree into content URLs
///
/// The walk is depth-first and strictly sequential: one fetch at a time, with
/// a fixed delay before each. A visited set guarantees that every sitemap URL
/// is fetched at most once, so cyclic or diamond-shaped indexes terminate.
pub struct SitemapTraverser {
    fetcher: Arc<dyn Fetch>,
    strategy: FetchStrategy,
    request_delay: Duration,
}

impl SitemapTraverser {
    pub fn new(fetcher: Arc<dyn Fetch>, strategy: FetchStrategy, request_delay: Duration) -> Self {
        Self {
            fetcher,
            strategy,
            request_delay,
        }
    }

    /// Walks the whole tree rooted at `root` and collects every leaf URL
    pub async fn walk(&self, root: &str) -> SitemapWalk {
        let mut walk = SitemapWalk::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack = vec![root.to_string()];

        while let Some(url) = stack.pop() {
            if !visited.insert(url.clone()) {
                debug!("Already visited sitemap: {}", url);
                continue;
            }
            walk.visited.push(url.clone());

            info!("Processing sitemap: {}", url);
            tokio::time::sleep(self.request_delay).await;

            let result = self
                .fetcher
                .fetch(&url, self.strategy, &FetchOptions::default())
                .await;

            let Some(body) = result.body.as_deref() else {
                let message = result.error_message();
                error!("Error parsing {}: {}", url, message);
                walk.failures.push(NodeFailure { url, message });
                continue;
            };

            let node = SitemapNode::from_body(&url, body);
            match node.kind {
                SitemapKind::Index => {
                    info!(
                        "Found {} nested sitemaps in {}",
                        node.children.len(),
                        node.url
                    );
                    // Reversed so the first child is expanded first
                    stack.extend(
                        node.children
                            .into_iter()
                            .rev()
                            .filter(|child| !visited.contains(child)),
                    );
                }
                SitemapKind::UrlSet => {
                    if node.leaf_urls.is_empty() {
                        warn!("No URLs found in {}", node.url);
                    } else {
                        info!("Found {} URLs in {}", node.leaf_urls.len(), node.url);
                    }
                    walk.leaf_urls.extend(node.leaf_urls);
                }
            }
        }

        walk
    }

    /// Walks the tree, then filters the complete leaf set
    ///
    /// The walk is returned alongside the URLs so callers can inspect
    /// per-node failures.
    pub async fn expand(&self, root: &str, filters: &FilterPatterns) -> SitemapExpansion {
        let walk = self.walk(root).await;
        if walk.leaf_urls.is_empty() {
            warn!("No URLs found in any sitemap under {}", root);
            return SitemapExpansion {
                urls: Vec::new(),
                walk,
            };
        }

        let urls = filters.apply(&walk.leaf_urls);
        info!(
            "Total URLs extracted: {} (from {} before filtering/deduplication)",
            urls.len(),
            walk.leaf_urls.len()
        );
        SitemapExpansion { urls, walk }
    }
}
