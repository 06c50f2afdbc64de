use crate::fetch::{Fetch, FetchOptions, FetchStrategy};
use crate::robots::{robots_url, sitemap_directives};
use crate::sitemap::document::is_sitemap_body;
use crate::url::{join_root, site_root};
use crate::UrlError;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Finds the sitemap of a site
///
/// Candidates are tried strictly in order and the first body that looks
/// like a sitemap wins. Robots.txt is consulted only after every path
/// candidate has failed.
pub struct SitemapResolver {
    fetcher: Arc<dyn Fetch>,
    strategy: FetchStrategy,
    patterns: Vec<String>,
}

impl SitemapResolver {
    pub fn new(fetcher: Arc<dyn Fetch>, strategy: FetchStrategy, patterns: Vec<String>) -> Self {
        Self {
            fetcher,
            strategy,
            patterns,
        }
    }

    /// Discovers the sitemap URL for a host
    ///
    /// # Arguments
    ///
    /// * `host` - Site URL or bare host
    /// * `custom_patterns` - Extra path candidates, tried after the built-in ones
    ///
    /// # Returns
    ///
    /// * `Ok(Some(url))` - First accepted candidate
    /// * `Ok(None)` - No candidate hosts a sitemap
    /// * `Err(UrlError)` - The host cannot be turned into a site root
    pub async fn discover(
        &self,
        host: &str,
        custom_patterns: &[String],
    ) -> Result<Option<String>, UrlError> {
        let root = site_root(host)?;
        info!("Discovering sitemap for {}", root);

        for path in candidate_paths(&self.patterns, custom_patterns) {
            let candidate = join_root(&root, &path);
            if self.check_candidate(&candidate).await {
                info!("Found sitemap: {}", candidate);
                return Ok(Some(candidate));
            }
        }

        for candidate in self.robots_sitemaps(&root).await {
            if self.check_candidate(&candidate).await {
                info!("Found sitemap from robots.txt: {}", candidate);
                return Ok(Some(candidate));
            }
        }

        warn!("No sitemap found for {}", root);
        Ok(None)
    }

    async fn check_candidate(&self, url: &str) -> bool {
        let result = self
            .fetcher
            .fetch(url, self.strategy, &FetchOptions::default())
            .await;

        match result.body {
            Some(body) if is_sitemap_body(&body) => true,
            Some(_) => {
                debug!("{} is not a sitemap document", url);
                false
            }
            None => false,
        }
    }

    async fn robots_sitemaps(&self, root: &str) -> Vec<String> {
        let url = robots_url(root);
        let result = self
            .fetcher
            .fetch(&url, self.strategy, &FetchOptions::default())
            .await;

        let Some(body) = result.body else {
            return Vec::new();
        };

        let sitemaps: Vec<String> = sitemap_directives(&body)
            .iter()
            .filter_map(|value| resolve_directive(root, value))
            .collect();
        info!("Found {} sitemaps in robots.txt for {}", sitemaps.len(), root);
        sitemaps
    }
}

/// Resolves a robots.txt `Sitemap:` value against the site root
///
/// Relative values such as `/sitemap.xml` are joined onto the root; values
/// that cannot be resolved are dropped.
fn resolve_directive(root: &str, value: &str) -> Option<String> {
    let base = Url::parse(root).ok()?;
    match base.join(value) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            debug!("Ignoring robots.txt sitemap {:?}: {}", value, e);
            None
        }
    }
}

/// Built-in candidates followed by custom ones, duplicates removed
fn candidate_paths(patterns: &[String], custom_patterns: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    patterns
        .iter()
        .chain(custom_patterns)
        .filter(|path| seen.insert(path.as_str()))
        .cloned()
        .collect()
}
