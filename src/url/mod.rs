//! URL handling module for Linkscape
//!
//! This module provides scheme upgrading, site-root normalization, host
//! extraction, excluded-domain matching and link host classification.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{host_with_port, strip_www};
pub use matcher::is_excluded_host;
pub use normalize::{join_root, site_root, upgrade_scheme};

/// Host classification for a link found on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostClassification {
    /// Same network location as the page
    Internal,
    /// Matches an excluded domain
    Excluded,
    /// Reportable external link
    External,
}

impl HostClassification {
    /// Returns true if links with this classification are reported
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::External)
    }
}

/// Classifies a link host relative to the page it was found on
///
/// Checks are applied in this order:
/// 1. Same host as the page (exact, case-insensitive, port included)
/// 2. Excluded domain list
/// 3. External (default)
///
/// # Examples
///
/// ```
/// use linkscape::url::{classify_host, HostClassification};
///
/// let excluded = vec!["twitter.com".to_string()];
/// assert_eq!(classify_host("example.com", "example.com", &excluded), HostClassification::Internal);
/// assert_eq!(classify_host("twitter.com", "example.com", &excluded), HostClassification::Excluded);
/// assert_eq!(classify_host("other.org", "example.com", &excluded), HostClassification::External);
/// ```
pub fn classify_host(
    link_host: &str,
    page_host: &str,
    excluded_domains: &[String],
) -> HostClassification {
    if link_host.eq_ignore_ascii_case(page_host) {
        return HostClassification::Internal;
    }

    if is_excluded_host(link_host, excluded_domains) {
        return HostClassification::Excluded;
    }

    HostClassification::External
}
