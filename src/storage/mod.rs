//! Storage module for persisting audit data
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Sites and their sitemap outcomes
//! - Posts and the external links found on them
//! - Crawl history with config hashes

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::extract::LinkLocation;
use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> crate::Result<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents a site in the database
#[derive(Debug, Clone)]
pub struct SiteRecord {
    pub id: i64,
    pub url: String,
    pub sitemap_url: Option<String>,
    /// Last sitemap phase status (`success`, `no_sitemap`, `error`)
    pub sitemap_status: Option<String>,
    pub total_posts: u64,
    pub total_outgoing_links: u64,
    pub last_crawled_at: Option<String>,
    pub created_at: String,
}

/// Represents a post in the database
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub id: i64,
    pub site_id: i64,
    pub url: String,
    pub status: PostStatus,
    pub total_links: u64,
    pub fetch_strategy: Option<String>,
    pub screenshot_path: Option<String>,
    pub error_message: Option<String>,
    pub discovered_at: String,
    pub crawled_at: Option<String>,
}

/// Represents a stored external link
#[derive(Debug, Clone)]
pub struct LinkRecord {
    pub id: i64,
    pub post_id: i64,
    pub site_id: i64,
    pub url: String,
    pub domain: String,
    pub anchor_text: Option<String>,
    pub rel_attributes: Option<String>,
    pub target: Option<String>,
    pub link_location: LinkLocation,
    pub is_article_link: bool,
    pub position_paragraph: u32,
    pub position_word: u32,
}

/// Represents a crawl history entry
#[derive(Debug, Clone)]
pub struct CrawlRecord {
    pub id: i64,
    pub site_id: Option<i64>,
    pub crawl_type: CrawlType,
    pub status: RunStatus,
    pub config_hash: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub new_posts_found: u64,
    pub new_links_found: u64,
    pub errors_count: u64,
}

/// Counters written when a crawl completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlTotals {
    pub new_posts_found: u64,
    pub new_links_found: u64,
    pub errors_count: u64,
}

/// Processing state of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostStatus {
    Pending,
    Crawled,
    Error,
}

impl PostStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Crawled => "crawled",
            Self::Error => "error",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "crawled" => Some(Self::Crawled),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Phase recorded by a crawl history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlType {
    Sitemap,
    Links,
}

impl CrawlType {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Sitemap => "sitemap",
            Self::Links => "link_extraction",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "sitemap" => Some(Self::Sitemap),
            "link_extraction" => Some(Self::Links),
            _ => None,
        }
    }
}

/// Status of a crawl history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
