//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::PageLinks;
use crate::sitemap::CrawlOutcome;
use crate::storage::{
    CrawlRecord, CrawlTotals, CrawlType, LinkRecord, PostRecord, PostStatus, RunStatus, SiteRecord,
};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Site not found: {0}")]
    SiteNotFound(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Crawl not found: {0}")]
    CrawlNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The pipeline hands over finished results only: a [`CrawlOutcome`] per site
/// and a [`PageLinks`] per post. Nothing here is called while a batch is in
/// flight.
pub trait Storage {
    // ===== Sites =====

    /// Inserts a site or returns the existing site ID
    fn upsert_site(&mut self, url: &str) -> StorageResult<i64>;

    fn get_site(&self, site_id: i64) -> StorageResult<SiteRecord>;

    fn get_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>>;

    fn list_sites(&self) -> StorageResult<Vec<SiteRecord>>;

    // ===== Sitemap phase =====

    /// Stores the outcome of a site's sitemap phase
    ///
    /// Every URL not already known is inserted as a pending post. Returns the
    /// number of new posts.
    fn record_sitemap_outcome(&mut self, site_id: i64, outcome: &CrawlOutcome)
        -> StorageResult<u64>;

    // ===== Posts =====

    /// Gets a site's posts, optionally restricted to one status
    fn get_posts(&self, site_id: i64, status: Option<PostStatus>) -> StorageResult<Vec<PostRecord>>;

    fn get_post_by_url(&self, url: &str) -> StorageResult<Option<PostRecord>>;

    // ===== Link extraction phase =====

    /// Stores the extraction result of a post
    ///
    /// Replaces any links previously stored for the post and marks it
    /// `crawled` or `error`. Returns the number of links stored.
    fn record_page_links(&mut self, post_id: i64, page: &PageLinks) -> StorageResult<u64>;

    fn get_links_for_post(&self, post_id: i64) -> StorageResult<Vec<LinkRecord>>;

    // ===== Crawl history =====

    /// Opens a crawl history entry in the `running` state
    fn start_crawl(
        &mut self,
        site_id: Option<i64>,
        crawl_type: CrawlType,
        config_hash: &str,
    ) -> StorageResult<i64>;

    /// Closes a crawl history entry with its final counters
    fn complete_crawl(
        &mut self,
        crawl_id: i64,
        status: RunStatus,
        totals: CrawlTotals,
    ) -> StorageResult<()>;

    fn get_crawl(&self, crawl_id: i64) -> StorageResult<CrawlRecord>;

    fn get_latest_crawl(&self) -> StorageResult<Option<CrawlRecord>>;

    // ===== Statistics =====

    fn count_sites(&self) -> StorageResult<u64>;

    fn count_posts_by_status(&self, status: PostStatus) -> StorageResult<u64>;

    fn count_links(&self) -> StorageResult<u64>;

    /// Link counts per external domain, highest first
    fn top_linked_domains(&self, limit: usize) -> StorageResult<Vec<(String, u64)>>;
}
