//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::PageLinks;
use crate::extract::LinkLocation;
use crate::sitemap::CrawlOutcome;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{
    CrawlRecord, CrawlTotals, CrawlType, LinkRecord, PostRecord, PostStatus, RunStatus, SiteRecord,
};
use crate::url::host_with_port;
use crate::LinkscapeError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const SITE_COLUMNS: &str = "id, url, sitemap_url, sitemap_status, total_posts,
    total_outgoing_links, last_crawled_at, created_at";

const POST_COLUMNS: &str = "id, site_id, url, status, total_links, fetch_strategy,
    screenshot_path, error_message, discovered_at, crawled_at";

const LINK_COLUMNS: &str = "id, post_id, site_id, url, domain, anchor_text, rel_attributes,
    target, link_location, is_article_link, position_paragraph, position_word";

const CRAWL_COLUMNS: &str = "id, site_id, crawl_type, status, config_hash, started_at,
    finished_at, new_posts_found, new_links_found, errors_count";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> Result<Self, LinkscapeError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    ///
    /// Nothing is written to disk.
    pub fn new_in_memory() -> Result<Self, LinkscapeError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str, params: impl rusqlite::Params) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn site_from_row(row: &Row<'_>) -> rusqlite::Result<SiteRecord> {
    Ok(SiteRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        sitemap_url: row.get(2)?,
        sitemap_status: row.get(3)?,
        total_posts: row.get::<_, i64>(4)? as u64,
        total_outgoing_links: row.get::<_, i64>(5)? as u64,
        last_crawled_at: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRecord> {
    Ok(PostRecord {
        id: row.get(0)?,
        site_id: row.get(1)?,
        url: row.get(2)?,
        status: PostStatus::from_db_string(&row.get::<_, String>(3)?).unwrap_or(PostStatus::Error),
        total_links: row.get::<_, i64>(4)? as u64,
        fetch_strategy: row.get(5)?,
        screenshot_path: row.get(6)?,
        error_message: row.get(7)?,
        discovered_at: row.get(8)?,
        crawled_at: row.get(9)?,
    })
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<LinkRecord> {
    Ok(LinkRecord {
        id: row.get(0)?,
        post_id: row.get(1)?,
        site_id: row.get(2)?,
        url: row.get(3)?,
        domain: row.get(4)?,
        anchor_text: row.get(5)?,
        rel_attributes: row.get(6)?,
        target: row.get(7)?,
        link_location: LinkLocation::from_label(&row.get::<_, String>(8)?),
        is_article_link: row.get(9)?,
        position_paragraph: row.get(10)?,
        position_word: row.get(11)?,
    })
}

fn crawl_from_row(row: &Row<'_>) -> rusqlite::Result<CrawlRecord> {
    Ok(CrawlRecord {
        id: row.get(0)?,
        site_id: row.get(1)?,
        crawl_type: CrawlType::from_db_string(&row.get::<_, String>(2)?)
            .unwrap_or(CrawlType::Links),
        status: RunStatus::from_db_string(&row.get::<_, String>(3)?).unwrap_or(RunStatus::Failed),
        config_hash: row.get(4)?,
        started_at: row.get(5)?,
        finished_at: row.get(6)?,
        new_posts_found: row.get::<_, i64>(7)? as u64,
        new_links_found: row.get::<_, i64>(8)? as u64,
        errors_count: row.get::<_, i64>(9)? as u64,
    })
}

/// Host of a link URL as stored in the `domain` column
fn link_domain(url: &str) -> String {
    ::url::Url::parse(url)
        .ok()
        .and_then(|u| host_with_port(&u))
        .unwrap_or_default()
}

impl Storage for SqliteStorage {
    // ===== Sites =====

    fn upsert_site(&mut self, url: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR IGNORE INTO sites (url, created_at) VALUES (?1, ?2)",
            params![url, now],
        )?;

        let id = self
            .conn
            .query_row("SELECT id FROM sites WHERE url = ?1", params![url], |row| {
                row.get(0)
            })?;
        Ok(id)
    }

    fn get_site(&self, site_id: i64) -> StorageResult<SiteRecord> {
        let sql = format!("SELECT {} FROM sites WHERE id = ?1", SITE_COLUMNS);
        self.conn
            .query_row(&sql, params![site_id], site_from_row)
            .optional()?
            .ok_or_else(|| StorageError::SiteNotFound(format!("Site ID {}", site_id)))
    }

    fn get_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>> {
        let sql = format!("SELECT {} FROM sites WHERE url = ?1", SITE_COLUMNS);
        Ok(self.conn.query_row(&sql, params![url], site_from_row).optional()?)
    }

    fn list_sites(&self) -> StorageResult<Vec<SiteRecord>> {
        let sql = format!("SELECT {} FROM sites ORDER BY id", SITE_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let sites = stmt
            .query_map([], site_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    // ===== Sitemap phase =====

    fn record_sitemap_outcome(
        &mut self,
        site_id: i64,
        outcome: &CrawlOutcome,
    ) -> StorageResult<u64> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        let updated = tx.execute(
            "UPDATE sites SET sitemap_url = COALESCE(?1, sitemap_url), sitemap_status = ?2,
             last_crawled_at = ?3 WHERE id = ?4",
            params![outcome.sitemap_url, outcome.status.as_str(), now, site_id],
        )?;
        if updated == 0 {
            return Err(StorageError::SiteNotFound(format!("Site ID {}", site_id)));
        }

        let mut new_posts = 0u64;
        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO posts (site_id, url, status, discovered_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for url in &outcome.urls {
                new_posts += insert.execute(params![
                    site_id,
                    url,
                    PostStatus::Pending.to_db_string(),
                    now
                ])? as u64;
            }
        }

        tx.execute(
            "UPDATE sites SET total_posts = (SELECT COUNT(*) FROM posts WHERE site_id = ?1)
             WHERE id = ?1",
            params![site_id],
        )?;

        tx.commit()?;
        Ok(new_posts)
    }

    // ===== Posts =====

    fn get_posts(&self, site_id: i64, status: Option<PostStatus>) -> StorageResult<Vec<PostRecord>> {
        let posts = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {} FROM posts WHERE site_id = ?1 AND status = ?2 ORDER BY id",
                    POST_COLUMNS
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params![site_id, status.to_db_string()], post_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let sql = format!("SELECT {} FROM posts WHERE site_id = ?1 ORDER BY id", POST_COLUMNS);
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params![site_id], post_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(posts)
    }

    fn get_post_by_url(&self, url: &str) -> StorageResult<Option<PostRecord>> {
        let sql = format!("SELECT {} FROM posts WHERE url = ?1", POST_COLUMNS);
        Ok(self.conn.query_row(&sql, params![url], post_from_row).optional()?)
    }

    // ===== Link extraction phase =====

    fn record_page_links(&mut self, post_id: i64, page: &PageLinks) -> StorageResult<u64> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        let site_id: i64 = tx
            .query_row(
                "SELECT site_id FROM posts WHERE id = ?1",
                params![post_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StorageError::PostNotFound(format!("Post ID {}", post_id)))?;

        tx.execute("DELETE FROM outgoing_links WHERE post_id = ?1", params![post_id])?;

        let mut stored = 0u64;
        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO outgoing_links
                 (post_id, site_id, url, domain, anchor_text, rel_attributes, target,
                  link_location, is_article_link, position_paragraph, position_word, found_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for link in &page.links {
                stored += insert.execute(params![
                    post_id,
                    site_id,
                    link.url,
                    link_domain(&link.url),
                    link.anchor_text,
                    link.rel_attributes,
                    link.target,
                    link.location.as_str(),
                    link.is_article_link,
                    link.position_paragraph,
                    link.position_word,
                    now
                ])? as u64;
            }
        }

        let status = if page.is_success() {
            PostStatus::Crawled
        } else {
            PostStatus::Error
        };
        let screenshot = page
            .screenshot_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());

        tx.execute(
            "UPDATE posts SET status = ?1, total_links = ?2, fetch_strategy = ?3,
             screenshot_path = ?4, error_message = ?5, crawled_at = ?6 WHERE id = ?7",
            params![
                status.to_db_string(),
                stored as i64,
                page.strategy.as_str(),
                screenshot,
                page.message,
                now,
                post_id
            ],
        )?;

        tx.execute(
            "UPDATE sites SET total_outgoing_links =
             (SELECT COUNT(*) FROM outgoing_links WHERE site_id = ?1) WHERE id = ?1",
            params![site_id],
        )?;

        tx.commit()?;
        Ok(stored)
    }

    fn get_links_for_post(&self, post_id: i64) -> StorageResult<Vec<LinkRecord>> {
        let sql = format!(
            "SELECT {} FROM outgoing_links WHERE post_id = ?1 ORDER BY id",
            LINK_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let links = stmt
            .query_map(params![post_id], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    // ===== Crawl history =====

    fn start_crawl(
        &mut self,
        site_id: Option<i64>,
        crawl_type: CrawlType,
        config_hash: &str,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_history (site_id, crawl_type, status, config_hash, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                site_id,
                crawl_type.to_db_string(),
                RunStatus::Running.to_db_string(),
                config_hash,
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_crawl(
        &mut self,
        crawl_id: i64,
        status: RunStatus,
        totals: CrawlTotals,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE crawl_history SET status = ?1, finished_at = ?2, new_posts_found = ?3,
             new_links_found = ?4, errors_count = ?5 WHERE id = ?6",
            params![
                status.to_db_string(),
                now,
                totals.new_posts_found as i64,
                totals.new_links_found as i64,
                totals.errors_count as i64,
                crawl_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::CrawlNotFound(crawl_id));
        }
        Ok(())
    }

    fn get_crawl(&self, crawl_id: i64) -> StorageResult<CrawlRecord> {
        let sql = format!("SELECT {} FROM crawl_history WHERE id = ?1", CRAWL_COLUMNS);
        self.conn
            .query_row(&sql, params![crawl_id], crawl_from_row)
            .optional()?
            .ok_or(StorageError::CrawlNotFound(crawl_id))
    }

    fn get_latest_crawl(&self) -> StorageResult<Option<CrawlRecord>> {
        let sql = format!(
            "SELECT {} FROM crawl_history ORDER BY id DESC LIMIT 1",
            CRAWL_COLUMNS
        );
        Ok(self.conn.query_row(&sql, [], crawl_from_row).optional()?)
    }

    // ===== Statistics =====

    fn count_sites(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM sites", [])
    }

    fn count_posts_by_status(&self, status: PostStatus) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM posts WHERE status = ?1",
            params![status.to_db_string()],
        )
    }

    fn count_links(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM outgoing_links", [])
    }

    fn top_linked_domains(&self, limit: usize) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT domain, COUNT(*) AS n FROM outgoing_links
             GROUP BY domain ORDER BY n DESC, domain ASC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
