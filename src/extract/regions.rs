//! Content region detection

use crate::config::LinksConfig;
use crate::extract::LinkLocation;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Parses a CSS selector, mapping failures to a config error
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidPattern(format!("Invalid selector '{}': {:?}", selector, e)))
}

/// Locates the primary content region and the secondary link-bearing regions
/// of a page
pub struct ContentExtractor {
    content: Vec<(String, Selector)>,
    sidebars: Vec<(String, Selector)>,
    headings: Selector,
    body: Selector,
}

impl ContentExtractor {
    pub fn new(content_selectors: &[String], sidebar_selectors: &[String]) -> Result<Self, ConfigError> {
        let compile = |selectors: &[String]| -> Result<Vec<(String, Selector)>, ConfigError> {
            selectors
                .iter()
                .map(|s| Ok((s.clone(), parse_selector(s)?)))
                .collect()
        };

        Ok(Self {
            content: compile(content_selectors)?,
            sidebars: compile(sidebar_selectors)?,
            headings: parse_selector("h2")?,
            body: parse_selector("body")?,
        })
    }

    pub fn from_config(config: &LinksConfig) -> Result<Self, ConfigError> {
        Self::new(&config.content_selectors, &config.sidebar_selectors)
    }

    /// Returns the first match of the content selectors, in priority order
    ///
    /// Falls back to `<body>`, then to the document root.
    pub fn locate_primary<'a>(&self, document: &'a Html) -> ElementRef<'a> {
        for (name, selector) in &self.content {
            if let Some(region) = document.select(selector).next() {
                debug!("Found content using selector: {}", name);
                return region;
            }
        }

        debug!("No specific content area found, using body");
        document
            .select(&self.body)
            .next()
            .unwrap_or_else(|| document.root_element())
    }

    /// Returns the heading and sidebar regions of a page, in extraction order
    ///
    /// Every `<h2>` is its own region. Sidebar matches that sit inside the
    /// primary region are skipped because their links were already taken as
    /// article links.
    pub fn locate_secondary<'a>(
        &self,
        document: &'a Html,
        primary: ElementRef<'a>,
    ) -> Vec<(ElementRef<'a>, LinkLocation)> {
        let mut regions: Vec<(ElementRef<'a>, LinkLocation)> = document
            .select(&self.headings)
            .map(|heading| (heading, LinkLocation::Heading))
            .collect();

        for (name, selector) in &self.sidebars {
            for element in document.select(selector) {
                if is_descendant(element, primary) {
                    continue;
                }
                regions.push((element, LinkLocation::Sidebar(name.clone())));
            }
        }

        regions
    }
}

fn is_descendant(element: ElementRef<'_>, ancestor: ElementRef<'_>) -> bool {
    element.ancestors().any(|node| node.id() == ancestor.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_content_selectors, default_sidebar_selectors};

    fn extractor() -> ContentExtractor {
        ContentExtractor::new(&default_content_selectors(), &default_sidebar_selectors()).unwrap()
    }

    #[test]
    fn test_priority_order() {
        let html = Html::parse_document(
            r#"<body><main id="m"><article id="a">x</article></main></body>"#,
        );
        let primary = extractor().locate_primary(&html);
        assert_eq!(primary.value().id(), Some("a"));
    }

    #[test]
    fn test_role_main_before_main_element() {
        let html = Html::parse_document(
            r#"<body><main id="m">x</main><div role="main" id="r">y</div></body>"#,
        );
        let primary = extractor().locate_primary(&html);
        assert_eq!(primary.value().id(), Some("r"));
    }

    #[test]
    fn test_body_fallback() {
        let html = Html::parse_document("<p>No containers here</p>");
        let primary = extractor().locate_primary(&html);
        assert_eq!(primary.value().name(), "body");
    }

    #[test]
    fn test_secondary_regions() {
        let html = Html::parse_document(
            r#"<body>
                <article><h2>In article</h2><aside id="inner">note</aside></article>
                <h2>Outside</h2>
                <aside id="outer"><div class="widget" id="w">w</div></aside>
            </body>"#,
        );
        let extractor = extractor();
        let primary = extractor.locate_primary(&html);
        let regions = extractor.locate_secondary(&html, primary);

        let labels: Vec<String> = regions
            .iter()
            .map(|(el, loc)| format!("{}:{}", loc.as_str(), el.value().id().unwrap_or("-")))
            .collect();
        assert_eq!(
            labels,
            vec!["h2_heading:-", "h2_heading:-", "aside:outer", ".widget:w"]
        );
    }

    #[test]
    fn test_invalid_selector() {
        let result = ContentExtractor::new(&["<<<".to_string()], &[]);
        assert!(result.is_err());
    }
}
