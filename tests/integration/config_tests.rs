//! Configuration loading from disk

use linkscape::config::{load_config, load_config_with_hash};
use linkscape::ConfigError;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
[fetch]
timeout-secs = 15
max-retries = 2
retry-delay-ms = 100

[sitemap]
custom-patterns = ["/feeds/posts.xml"]
post-patterns = ["/blog/"]

[links]
excluded-domains = ["example.org"]

[crawler]
concurrency = 8
escalate = false

[output]
database-path = "./audit.db"

[[site]]
url = "example.com"

[[site]]
url = "https://news.example.net"
sitemap = "https://news.example.net/news-sitemap.xml"
"#,
    );

    let (config, hash) = load_config_with_hash(file.path()).unwrap();

    assert_eq!(config.fetch.timeout_secs, 15);
    assert_eq!(config.fetch.max_retries, 2);
    assert_eq!(config.sitemap.custom_patterns, vec!["/feeds/posts.xml"]);
    assert_eq!(config.links.excluded_domains, vec!["example.org"]);
    assert_eq!(config.crawler.concurrency, 8);
    assert!(!config.crawler.escalate);
    assert_eq!(config.output.database_path, "./audit.db");
    assert_eq!(config.sites.len(), 2);
    assert_eq!(
        config.sites[1].sitemap.as_deref(),
        Some("https://news.example.net/news-sitemap.xml")
    );

    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_hash_tracks_file_content() {
    let first = write_config("[[site]]\nurl = \"example.com\"\n");
    let second = write_config("[[site]]\nurl = \"example.org\"\n");

    let (_, hash_a) = load_config_with_hash(first.path()).unwrap();
    let (_, hash_a_again) = load_config_with_hash(first.path()).unwrap();
    let (_, hash_b) = load_config_with_hash(second.path()).unwrap();

    assert_eq!(hash_a, hash_a_again);
    assert_ne!(hash_a, hash_b);
}

#[test]
fn test_empty_file_uses_defaults() {
    let file = write_config("");
    let config = load_config(file.path()).unwrap();

    assert!(config.sites.is_empty());
    assert!(config.crawler.escalate);
    assert!(!config.sitemap.patterns.is_empty());
}

#[test]
fn test_invalid_regex_rejected() {
    let file = write_config("[sitemap]\npost-patterns = [\"/blog/(\"]\n");
    let result = load_config(file.path());
    assert!(matches!(result, Err(ConfigError::InvalidPattern(_))));
}

#[test]
fn test_missing_file() {
    let result = load_config(std::path::Path::new("/nonexistent/linkscape.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
