//! Linkscape: sitemap-driven outbound link auditing
//!
//! This crate discovers a website's content inventory through its sitemap(s)
//! and extracts classified external links from every discovered page, with
//! positional metadata for links found in the article body.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod robots;
pub mod sitemap;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Linkscape operations
#[derive(Debug, Error)]
pub enum LinkscapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Linkscape operations
pub type Result<T> = std::result::Result<T, LinkscapeError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Orchestrator, PageLinks, PageStatus};
pub use extract::{ExtractedLink, LinkLocation};
pub use fetch::{Fetch, FetchClient, FetchOptions, FetchOutcome, FetchResult, FetchStrategy};
pub use sitemap::{CrawlOutcome, CrawlStatus, FilterPatterns, SiteRequest, SitemapCrawler};
