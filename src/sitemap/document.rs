//! Sitemap document parser
//!
//! Parsing is best effort: malformed markup ends the scan early and whatever
//! was collected up to that point is returned.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

/// Kind of sitemap document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapKind {
    /// `<sitemapindex>` listing other sitemaps
    Index,
    /// `<urlset>` listing content pages
    UrlSet,
}

/// The `<loc>` values of a sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapDocument {
    pub kind: SitemapKind,
    /// Nested sitemap URLs for an index, page URLs for a urlset, in document order
    pub locations: Vec<String>,
}

impl SitemapDocument {
    pub fn is_index(&self) -> bool {
        self.kind == SitemapKind::Index
    }
}

/// Returns true if the body looks like a sitemap document
pub fn is_sitemap_body(body: &str) -> bool {
    body.contains("<urlset") || body.contains("<sitemapindex")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Entry {
    None,
    Sitemap,
    Url,
}

/// Parses a sitemap or sitemap index
///
/// A document containing a `sitemapindex` element anywhere is an index and
/// yields the first `<loc>` of each `<sitemap>` entry. Any other document is
/// treated as a urlset and yields the first `<loc>` of each `<url>` entry.
/// Namespace prefixes are ignored.
pub fn parse_sitemap(xml: &str) -> SitemapDocument {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;
    let mut buf = Vec::new();

    let mut is_index = false;
    let mut entry = Entry::None;
    let mut entry_has_loc = false;
    let mut in_loc = false;
    let mut text = String::new();
    let mut nested = Vec::new();
    let mut pages = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"sitemapindex" => is_index = true,
                b"sitemap" => {
                    entry = Entry::Sitemap;
                    entry_has_loc = false;
                }
                b"url" => {
                    entry = Entry::Url;
                    entry_has_loc = false;
                }
                b"loc" if entry != Entry::None => {
                    in_loc = true;
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"sitemapindex" {
                    is_index = true;
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_loc {
                    match e.unescape() {
                        Ok(value) => text.push_str(&value),
                        Err(_) => text.push_str(&String::from_utf8_lossy(&e[..])),
                    }
                }
            }
            Ok(Event::CData(ref e)) => {
                if in_loc {
                    text.push_str(&String::from_utf8_lossy(&e[..]));
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"loc" if in_loc => {
                    in_loc = false;
                    let loc = text.trim();
                    if !loc.is_empty() && !entry_has_loc {
                        entry_has_loc = true;
                        match entry {
                            Entry::Sitemap => nested.push(loc.to_string()),
                            Entry::Url => pages.push(loc.to_string()),
                            Entry::None => {}
                        }
                    }
                }
                b"sitemap" | b"url" => entry = Entry::None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(
                    "Malformed sitemap XML at position {}: {}",
                    reader.buffer_position(),
                    e
                );
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    if is_index {
        SitemapDocument {
            kind: SitemapKind::Index,
            locations: nested,
        }
    } else {
        SitemapDocument {
            kind: SitemapKind::UrlSet,
            locations: pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/blog/one</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc> https://example.com/blog/two </loc></url>
</urlset>"#;

        let doc = parse_sitemap(xml);
        assert_eq!(doc.kind, SitemapKind::UrlSet);
        assert_eq!(
            doc.locations,
            vec!["https://example.com/blog/one", "https://example.com/blog/two"]
        );
    }

    #[test]
    fn test_parse_index() {
        let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/post-sitemap.xml</loc></sitemap>
  <sitemap><loc>https://example.com/page-sitemap.xml</loc></sitemap>
</sitemapindex>"#;

        let doc = parse_sitemap(xml);
        assert!(doc.is_index());
        assert_eq!(
            doc.locations,
            vec![
                "https://example.com/post-sitemap.xml",
                "https://example.com/page-sitemap.xml"
            ]
        );
    }

    #[test]
    fn test_namespaced_elements() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sm:url><sm:loc>https://example.com/a</sm:loc></sm:url>
</sm:urlset>"#;

        assert_eq!(parse_sitemap(xml).locations, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_entities_and_cdata() {
        let xml = r#"<urlset>
  <url><loc>https://example.com/?a=1&amp;b=2</loc></url>
  <url><loc><![CDATA[https://example.com/cdata]]></loc></url>
</urlset>"#;

        assert_eq!(
            parse_sitemap(xml).locations,
            vec!["https://example.com/?a=1&b=2", "https://example.com/cdata"]
        );
    }

    #[test]
    fn test_image_loc_ignored() {
        let xml = r#"<urlset xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
  <url>
    <loc>https://example.com/post</loc>
    <image:image><image:loc>https://cdn.example.com/pic.jpg</image:loc></image:image>
  </url>
</urlset>"#;

        assert_eq!(parse_sitemap(xml).locations, vec!["https://example.com/post"]);
    }

    #[test]
    fn test_truncated_document_keeps_collected() {
        let xml = r#"<urlset>
  <url><loc>https://example.com/one</loc></url>
  <url><loc>https://example.com/two</loc></url>
  <url><loc>https://exam"#;

        let doc = parse_sitemap(xml);
        assert_eq!(
            doc.locations,
            vec!["https://example.com/one", "https://example.com/two"]
        );
    }

    #[test]
    fn test_not_xml() {
        let doc = parse_sitemap("<html><body>Not found</body></html>");
        assert_eq!(doc.kind, SitemapKind::UrlSet);
        assert!(doc.locations.is_empty());
    }

    #[test]
    fn test_is_sitemap_body() {
        assert!(is_sitemap_body("<?xml?><urlset></urlset>"));
        assert!(is_sitemap_body("<sitemapindex xmlns=\"x\">"));
        assert!(!is_sitemap_body("<html></html>"));
    }
}
