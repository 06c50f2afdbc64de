use serde::Deserialize;

/// Main configuration structure for Linkscape
///
/// Every section is optional in the TOML file; missing sections fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub sitemap: SitemapConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteEntry>,
}

/// HTTP and browser fetch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry budget for retryable failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// User agent sent by the lightweight strategy
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Extra wait after page load before the rendered document is read (milliseconds)
    #[serde(rename = "browser-settle-ms", default = "default_browser_settle_ms")]
    pub browser_settle_ms: u64,

    /// Directory for full-page screenshots taken by the browser strategy
    #[serde(rename = "screenshot-dir", default)]
    pub screenshot_dir: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            user_agent: default_user_agent(),
            browser_settle_ms: default_browser_settle_ms(),
            screenshot_dir: None,
        }
    }
}

/// Sitemap discovery and filtering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SitemapConfig {
    /// Built-in sitemap path candidates, tried in order
    #[serde(default = "default_sitemap_patterns")]
    pub patterns: Vec<String>,

    /// Extra path candidates, tried after the built-in ones
    #[serde(rename = "custom-patterns", default)]
    pub custom_patterns: Vec<String>,

    /// Regexes identifying content (post) URLs
    #[serde(rename = "post-patterns", default = "default_post_patterns")]
    pub post_patterns: Vec<String>,

    /// Regexes identifying URLs to drop
    #[serde(rename = "exclude-patterns", default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Fixed delay before each sitemap document fetch (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Fetch sitemap documents through the browser strategy
    #[serde(rename = "use-browser", default)]
    pub use_browser: bool,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            patterns: default_sitemap_patterns(),
            custom_patterns: Vec::new(),
            post_patterns: default_post_patterns(),
            exclude_patterns: default_exclude_patterns(),
            request_delay_ms: default_request_delay_ms(),
            use_browser: false,
        }
    }
}

/// Link extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LinksConfig {
    /// Hosts whose links are never reported
    #[serde(rename = "excluded-domains", default = "default_excluded_domains")]
    pub excluded_domains: Vec<String>,

    /// Primary content selectors, in priority order
    #[serde(rename = "content-selectors", default = "default_content_selectors")]
    pub content_selectors: Vec<String>,

    /// Sidebar/widget selectors scanned for secondary links
    #[serde(rename = "sidebar-selectors", default = "default_sidebar_selectors")]
    pub sidebar_selectors: Vec<String>,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            excluded_domains: default_excluded_domains(),
            content_selectors: default_content_selectors(),
            sidebar_selectors: default_sidebar_selectors(),
        }
    }
}

/// Extraction scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of in-flight fetch/extract tasks
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Re-fetch failed or link-less pages through the browser strategy
    #[serde(default = "default_escalate")]
    pub escalate: bool,

    /// Upper bound on the browser pass concurrency
    #[serde(
        rename = "browser-concurrency-cap",
        default = "default_browser_concurrency_cap"
    )]
    pub browser_concurrency_cap: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            escalate: default_escalate(),
            browser_concurrency_cap: default_browser_concurrency_cap(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// A site to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Site URL or bare host (e.g. "example.com")
    pub url: String,

    /// Known sitemap URL; skips discovery when set
    #[serde(default)]
    pub sitemap: Option<String>,

    /// Path to a saved sitemap document used instead of fetching
    #[serde(rename = "manual-xml", default)]
    pub manual_xml: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_browser_settle_ms() -> u64 {
    500
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_concurrency() -> u32 {
    20
}

fn default_escalate() -> bool {
    true
}

fn default_browser_concurrency_cap() -> u32 {
    10
}

fn default_database_path() -> String {
    "./linkscape.db".to_string()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Sitemap locations tried during discovery
pub fn default_sitemap_patterns() -> Vec<String> {
    to_strings(&[
        "/sitemap.xml",
        "/sitemap_index.xml",
        "/wp-sitemap.xml",
        "/sitemap-index.xml",
        "/post-sitemap.xml",
        "/news-sitemap.xml",
        "/sitemap-news.xml",
        "/page-sitemap.xml",
        "/article-sitemap.xml",
        "/sitemap1.xml",
        "/sitemap_posts.xml",
        "/blog-sitemap.xml",
        "/main-sitemap.xml",
        "/index-sitemap.xml",
        "/category-sitemap.xml",
    ])
}

/// Regexes matching post-like URLs
pub fn default_post_patterns() -> Vec<String> {
    to_strings(&[
        "/blog/",
        "/article/",
        "/news/",
        "/post/",
        "/story/",
        r"/\d{4}/\d{2}/",
    ])
}

/// Regexes matching archive, taxonomy and static pages
pub fn default_exclude_patterns() -> Vec<String> {
    to_strings(&[
        "/category/",
        "/tag/",
        "/author/",
        "/page/",
        "/about/?$",
        "/contact/?$",
        "/privacy/?$",
        "/terms/?$",
    ])
}

/// Social networks, trackers and link shorteners
pub fn default_excluded_domains() -> Vec<String> {
    to_strings(&[
        "facebook.com",
        "twitter.com",
        "x.com",
        "instagram.com",
        "linkedin.com",
        "pinterest.com",
        "youtube.com",
        "tiktok.com",
        "reddit.com",
        "google.com",
        "google-analytics.com",
        "googletagmanager.com",
        "doubleclick.net",
        "facebook.net",
        "fbcdn.net",
        "gstatic.com",
        "t.co",
        "bit.ly",
        "ow.ly",
        "tinyurl.com",
    ])
}

/// Primary content selectors
pub fn default_content_selectors() -> Vec<String> {
    to_strings(&[
        "article",
        "[role=\"main\"]",
        "main",
        ".post-content",
        ".entry-content",
        ".article-content",
        "#content",
        ".content",
    ])
}

/// Secondary (sidebar, blogroll, related posts) selectors
pub fn default_sidebar_selectors() -> Vec<String> {
    to_strings(&[
        "aside",
        ".sidebar",
        "#sidebar",
        ".widget",
        ".blogroll",
        ".related-posts",
        ".sticky",
    ])
}
