//! Robots.txt handling module
//!
//! This module locates a site's robots.txt and reads the sitemap locations
//! it announces. Sitemap discovery falls back to these when no path candidate
//! hosts a sitemap.

mod parser;

pub use parser::SitemapDirectives;

use crate::url::join_root;

/// Returns the robots.txt URL for a site root (`scheme://host[:port]`)
pub fn robots_url(site_root: &str) -> String {
    join_root(site_root, "/robots.txt")
}

/// Extracts sitemap URLs from robots.txt content, in declaration order
pub fn sitemap_directives(content: &str) -> Vec<String> {
    SitemapDirectives::from_content(content).into_urls()
}
