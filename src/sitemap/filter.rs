use crate::config::SitemapConfig;
use crate::ConfigError;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Post-inclusion and exclusion patterns applied to collected sitemap URLs
///
/// All patterns are case-insensitive regexes searched anywhere in the URL.
#[derive(Debug, Clone)]
pub struct FilterPatterns {
    post: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl FilterPatterns {
    pub fn new(post_patterns: &[String], exclude_patterns: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            post: compile(post_patterns)?,
            exclude: compile(exclude_patterns)?,
        })
    }

    pub fn from_config(config: &SitemapConfig) -> Result<Self, ConfigError> {
        Self::new(&config.post_patterns, &config.exclude_patterns)
    }

    pub fn matches_post(&self, url: &str) -> bool {
        self.post.iter().any(|re| re.is_match(url))
    }

    pub fn matches_exclude(&self, url: &str) -> bool {
        self.exclude.iter().any(|re| re.is_match(url))
    }

    /// Returns true when no URL in the set matches any post pattern
    ///
    /// With no post patterns at all every non-excluded URL is kept, which is
    /// the same result.
    pub fn is_permissive(&self, urls: &[String]) -> bool {
        !urls.iter().any(|url| self.matches_post(url))
    }

    /// Filters the full collected URL set
    ///
    /// Exclusion is checked first in both modes. The result is deduplicated,
    /// keeping the first occurrence of each URL.
    pub fn apply(&self, urls: &[String]) -> Vec<String> {
        let permissive = self.is_permissive(urls);
        if permissive && !self.post.is_empty() {
            warn!("No URLs matched post patterns, using permissive mode");
        }

        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for url in urls {
            if self.matches_exclude(url) {
                debug!("Excluding {} (matched exclude pattern)", url);
                continue;
            }
            if !permissive && !self.matches_post(url) {
                debug!("Excluding {} (no post pattern matched)", url);
                continue;
            }
            if seen.insert(url.as_str()) {
                kept.push(url.clone());
            }
        }

        info!(
            "Filtered {} URLs to {} (permissive_mode={})",
            urls.len(),
            kept.len(),
            permissive
        );
        kept
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
        })
        .collect()
}
