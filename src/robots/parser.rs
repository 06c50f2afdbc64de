//! Robots.txt sitemap directive parser
//!
//! This module reads robots.txt content using the robotstxt crate. Only
//! `Sitemap:` lines matter for discovery; access rules are not consulted.

use robotstxt::{parse_robotstxt, RobotsParseHandler};

/// Sitemap directives announced in a robots.txt file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDirectives {
    urls: Vec<String>,
}

impl SitemapDirectives {
    /// Parses raw robots.txt content
    ///
    /// Directives are kept in declaration order; empty values are skipped.
    pub fn from_content(content: &str) -> Self {
        let mut directives = Self::default();
        parse_robotstxt(content, &mut directives);
        directives
    }

    /// Returns the announced sitemap values in declaration order
    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }
}

impl RobotsParseHandler for SitemapDirectives {
    fn handle_robots_start(&mut self) {
        self.urls.clear();
    }

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, _user_agent: &str) {}

    fn handle_allow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_disallow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_sitemap(&mut self, _line_num: u32, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.urls.push(value.to_string());
        }
    }

    fn handle_unknown_action(&mut self, _line_num: u32, _action: &str, _value: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(content: &str) -> Vec<String> {
        SitemapDirectives::from_content(content).into_urls()
    }

    #[test]
    fn test_single_directive() {
        assert_eq!(
            urls("Sitemap: https://example.com/sitemap.xml"),
            vec!["https://example.com/sitemap.xml"]
        );
    }

    #[test]
    fn test_declaration_order_kept() {
        let content = "User-agent: *\n\
                       Disallow: /admin\n\
                       Sitemap: https://example.com/b.xml\n\
                       sitemap: https://example.com/a.xml\n";
        assert_eq!(
            urls(content),
            vec!["https://example.com/b.xml", "https://example.com/a.xml"]
        );
    }

    #[test]
    fn test_case_insensitive_and_indented() {
        let content = "   SITEMAP:   https://example.com/upper.xml   \r\n";
        assert_eq!(urls(content), vec!["https://example.com/upper.xml"]);
    }

    #[test]
    fn test_no_directives() {
        assert!(urls("User-agent: *\nDisallow: /").is_empty());
    }

    #[test]
    fn test_relative_value_kept_verbatim() {
        assert_eq!(urls("Sitemap: /relative.xml"), vec!["/relative.xml"]);
    }

    #[test]
    fn test_commented_directive_ignored() {
        assert!(urls("# Sitemap: https://example.com/commented.xml\n").is_empty());
    }
}
