//! Link extraction module for Linkscape
//!
//! This module turns a fetched HTML document into the external links it
//! contains:
//! - Locating the primary content region and secondary regions
//! - Classifying links against the page host and excluded domains
//! - Computing paragraph/word positions for article links

mod links;
mod position;
mod regions;

pub use links::{resolve_href, LinkClassifier, MAX_ANCHOR_CHARS};
pub use position::{link_position, LinkPosition};
pub use regions::ContentExtractor;

use crate::config::LinksConfig;
use crate::url::host_with_port;
use crate::{ConfigError, UrlError};
use scraper::Html;
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Region of the page a link was found in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkLocation {
    Article,
    Heading,
    /// Sidebar region, labeled with the selector that matched it
    Sidebar(String),
}

impl LinkLocation {
    pub fn as_str(&self) -> &str {
        match self {
            LinkLocation::Article => "article",
            LinkLocation::Heading => "h2_heading",
            LinkLocation::Sidebar(selector) => selector,
        }
    }

    /// Parses a stored location label
    pub fn from_label(label: &str) -> Self {
        match label {
            "article" => LinkLocation::Article,
            "h2_heading" => LinkLocation::Heading,
            other => LinkLocation::Sidebar(other.to_string()),
        }
    }

    pub fn is_article(&self) -> bool {
        matches!(self, LinkLocation::Article)
    }
}

impl fmt::Display for LinkLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An external link found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    /// Absolute URL
    pub url: String,
    pub anchor_text: String,
    /// Comma-joined `rel` values
    pub rel_attributes: Option<String>,
    pub target: Option<String>,
    pub location: LinkLocation,
    pub is_article_link: bool,
    /// 0 for non-article links
    pub position_paragraph: u32,
    /// 0 for non-article links
    pub position_word: u32,
}

/// Extracts the external links of an HTML page
///
/// Regions are processed in a fixed order: the article region first, then
/// each `<h2>`, then sidebar regions. A URL is reported once per page and the
/// first region that yields it wins, so a link that appears both in the
/// article and in a sidebar keeps its article metadata.
pub struct PageExtractor {
    regions: ContentExtractor,
    classifier: LinkClassifier,
}

impl PageExtractor {
    pub fn new(regions: ContentExtractor, classifier: LinkClassifier) -> Self {
        Self {
            regions,
            classifier,
        }
    }

    pub fn from_config(config: &LinksConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            ContentExtractor::from_config(config)?,
            LinkClassifier::new(config.excluded_domains.clone())?,
        ))
    }

    /// Extracts links from `html`, resolving relative hrefs against `page_url`
    pub fn extract(&self, html: &str, page_url: &str) -> Result<Vec<ExtractedLink>, UrlError> {
        let base = Url::parse(page_url).map_err(|e| UrlError::Parse(format!("{}: {}", page_url, e)))?;
        let page_host =
            host_with_port(&base).ok_or_else(|| UrlError::MissingHost(page_url.to_string()))?;

        let document = Html::parse_document(html);
        let primary = self.regions.locate_primary(&document);

        let mut links =
            self.classifier
                .extract(primary, &base, &page_host, &LinkLocation::Article);

        for (region, location) in self.regions.locate_secondary(&document, primary) {
            links.extend(self.classifier.extract(region, &base, &page_host, &location));
        }

        let mut seen = HashSet::new();
        links.retain(|link| seen.insert(link.url.clone()));
        Ok(links)
    }
}
