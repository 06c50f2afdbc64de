use crate::config::types::{Config, CrawlerConfig, FetchConfig, LinksConfig, SiteEntry, SitemapConfig};
use crate::url::site_root;
use crate::ConfigError;
use regex::RegexBuilder;
use scraper::Selector;

/// Upper bound for the base retry delay (10 minutes)
const MAX_RETRY_DELAY_MS: u64 = 600_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_sitemap_config(&config.sitemap)?;
    validate_links_config(&config.links)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_sites(&config.sites)?;
    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.retry_delay_ms > MAX_RETRY_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "retry_delay_ms must be <= {}, got {}",
            MAX_RETRY_DELAY_MS, config.retry_delay_ms
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_sitemap_config(config: &SitemapConfig) -> Result<(), ConfigError> {
    for pattern in config.patterns.iter().chain(&config.custom_patterns) {
        if !pattern.starts_with('/') {
            return Err(ConfigError::InvalidPattern(format!(
                "Sitemap path '{}' must start with '/'",
                pattern
            )));
        }
    }

    for pattern in config.post_patterns.iter().chain(&config.exclude_patterns) {
        validate_regex(pattern)?;
    }

    Ok(())
}

fn validate_links_config(config: &LinksConfig) -> Result<(), ConfigError> {
    for domain in &config.excluded_domains {
        if domain.trim().is_empty() {
            return Err(ConfigError::InvalidPattern(
                "Excluded domain cannot be empty".to_string(),
            ));
        }
    }

    if config.content_selectors.is_empty() {
        return Err(ConfigError::Validation(
            "content_selectors must list at least one selector".to_string(),
        ));
    }

    for selector in config
        .content_selectors
        .iter()
        .chain(&config.sidebar_selectors)
    {
        validate_selector(selector)?;
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.browser_concurrency_cap < 1 {
        return Err(ConfigError::Validation(format!(
            "browser_concurrency_cap must be >= 1, got {}",
            config.browser_concurrency_cap
        )));
    }

    Ok(())
}

fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    for site in sites {
        site_root(&site.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site '{}': {}", site.url, e)))?;

        if let Some(sitemap) = &site.sitemap {
            url::Url::parse(sitemap).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid sitemap URL '{}': {}", sitemap, e))
            })?;
        }
    }

    Ok(())
}

/// Checks that a filter pattern compiles as a case-insensitive regex
fn validate_regex(pattern: &str) -> Result<(), ConfigError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
}

fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidPattern(format!("Invalid selector '{}': {:?}", selector, e)))
}
