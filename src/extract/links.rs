//! Outbound link classification

use crate::extract::position::link_position;
use crate::extract::regions::parse_selector;
use crate::extract::{ExtractedLink, LinkLocation};
use crate::url::{classify_host, host_with_port};
use crate::ConfigError;
use scraper::{ElementRef, Selector};
use url::Url;

/// Anchor text is cut to this many characters
pub const MAX_ANCHOR_CHARS: usize = 500;

const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:"];

/// Extracts external links from a region
pub struct LinkClassifier {
    anchors: Selector,
    excluded_domains: Vec<String>,
}

impl LinkClassifier {
    pub fn new(excluded_domains: Vec<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            anchors: parse_selector("a[href]")?,
            excluded_domains,
        })
    }

    /// Extracts every reportable link inside `region`
    ///
    /// # Link Rules
    ///
    /// **Skip:**
    /// - Empty and fragment-only hrefs
    /// - `javascript:`, `mailto:`, `tel:` hrefs
    /// - URLs that are not HTTP(S) after resolution
    /// - Links to `page_host` itself (internal)
    /// - Links to excluded domains
    ///
    /// Position is computed only when `location` is the article region.
    pub fn extract(
        &self,
        region: ElementRef<'_>,
        page_url: &Url,
        page_host: &str,
        location: &LinkLocation,
    ) -> Vec<ExtractedLink> {
        let is_article = location.is_article();
        let mut links = Vec::new();

        for anchor in region.select(&self.anchors) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(url) = resolve_href(href, page_url) else {
                continue;
            };
            let Some(host) = host_with_port(&url) else {
                continue;
            };

            if !classify_host(&host, page_host, &self.excluded_domains).is_reported() {
                continue;
            }

            let position = if is_article {
                link_position(region, anchor)
            } else {
                Default::default()
            };

            links.push(ExtractedLink {
                url: url.to_string(),
                anchor_text: anchor_text(anchor),
                rel_attributes: rel_attributes(anchor),
                target: anchor.value().attr("target").map(|t| t.to_string()),
                location: location.clone(),
                is_article_link: is_article,
                position_paragraph: position.paragraph,
                position_word: position.word,
            });
        }

        links
    }
}

/// Resolves an href against the page URL
///
/// Returns None for hrefs that never produce a reportable link.
pub fn resolve_href(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    let url = page_url.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}

fn anchor_text(anchor: ElementRef<'_>) -> String {
    let text = anchor.text().collect::<Vec<_>>().join(" ");
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_ANCHOR_CHARS)
        .collect()
}

fn rel_attributes(anchor: ElementRef<'_>) -> Option<String> {
    let rel = anchor.value().attr("rel")?;
    let values: Vec<&str> = rel.split_whitespace().collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn page_url() -> Url {
        Url::parse("https://example.com/blog/post").unwrap()
    }

    fn classify(html: &str, excluded: &[&str], location: LinkLocation) -> Vec<ExtractedLink> {
        let document = Html::parse_document(html);
        let classifier =
            LinkClassifier::new(excluded.iter().map(|s| s.to_string()).collect()).unwrap();
        classifier.extract(document.root_element(), &page_url(), "example.com", &location)
    }

    #[test]
    fn test_resolve_relative_and_protocol_relative() {
        let base = page_url();
        assert_eq!(
            resolve_href("//other.org/x", &base).unwrap().as_str(),
            "https://other.org/x"
        );
        assert_eq!(
            resolve_href("../about", &base).unwrap().as_str(),
            "https://example.com/about"
        );
    }

    #[test]
    fn test_resolve_skips() {
        let base = page_url();
        for href in ["", "   ", "#top", "javascript:void(0)", "JavaScript:alert(1)", "mailto:a@b.c", "tel:+123", "ftp://files.org/x", "data:text/plain,hi"] {
            assert!(resolve_href(href, &base).is_none(), "{}", href);
        }
    }

    #[test]
    fn test_internal_links_dropped() {
        let links = classify(
            r#"<a href="/local">a</a><a href="https://example.com/x">b</a><a href="https://other.org/">c</a>"#,
            &[],
            LinkLocation::Article,
        );
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://other.org/");
    }

    #[test]
    fn test_www_variant_of_page_host_is_external() {
        let links = classify(r#"<a href="https://www.example.com/">w</a>"#, &[], LinkLocation::Article);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_exclusion_both_directions() {
        let html = r#"<a href="https://sub.excluded.com/a">1</a><a href="https://excluded.com/b">2</a>"#;

        let links = classify(html, &["excluded.com"], LinkLocation::Article);
        assert!(links.is_empty(), "entry contained in host");

        let links = classify(html, &["sub.excluded.com"], LinkLocation::Article);
        assert!(links.is_empty(), "host contained in entry");
    }

    #[test]
    fn test_attributes() {
        let links = classify(
            r#"<a href="https://other.org/" rel="nofollow  sponsored" target="_blank">
                 Some   <b>bold</b>
                 text
               </a>"#,
            &[],
            LinkLocation::Heading,
        );
        assert_eq!(links[0].anchor_text, "Some bold text");
        assert_eq!(links[0].rel_attributes.as_deref(), Some("nofollow,sponsored"));
        assert_eq!(links[0].target.as_deref(), Some("_blank"));
        assert!(!links[0].is_article_link);
        assert_eq!(links[0].location.as_str(), "h2_heading");
    }

    #[test]
    fn test_anchor_text_truncated() {
        let long = "x".repeat(800);
        let html = format!(r#"<a href="https://other.org/">{}</a>"#, long);
        let links = classify(&html, &[], LinkLocation::Article);
        assert_eq!(links[0].anchor_text.chars().count(), MAX_ANCHOR_CHARS);
    }

    #[test]
    fn test_empty_rel_is_none() {
        let links = classify(r#"<a href="https://other.org/" rel=" ">x</a>"#, &[], LinkLocation::Article);
        assert_eq!(links[0].rel_attributes, None);
    }

    #[test]
    fn test_non_article_links_have_no_position() {
        let links = classify(
            r#"<p>Some words <a href="https://other.org/">x</a></p>"#,
            &[],
            LinkLocation::Sidebar(".widget".to_string()),
        );
        assert_eq!(links[0].position_paragraph, 0);
        assert_eq!(links[0].position_word, 0);
    }
}
