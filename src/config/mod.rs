//! Configuration module for Linkscape
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use linkscape::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkscape.toml")).unwrap();
//! println!("Fetch timeout: {}s", config.fetch.timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_content_selectors, default_exclude_patterns, default_excluded_domains,
    default_post_patterns, default_sidebar_selectors, default_sitemap_patterns, Config,
    CrawlerConfig, FetchConfig, LinksConfig, OutputConfig, SiteEntry, SitemapConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
