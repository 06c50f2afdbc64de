//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Linkscape database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Sites under audit
CREATE TABLE IF NOT EXISTS sites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    sitemap_url TEXT,
    sitemap_status TEXT,
    total_posts INTEGER NOT NULL DEFAULT 0,
    total_outgoing_links INTEGER NOT NULL DEFAULT 0,
    last_crawled_at TEXT,
    created_at TEXT NOT NULL
);

-- Content URLs discovered through sitemaps
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site_id INTEGER NOT NULL REFERENCES sites(id),
    url TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL,
    total_links INTEGER NOT NULL DEFAULT 0,
    fetch_strategy TEXT,
    screenshot_path TEXT,
    error_message TEXT,
    discovered_at TEXT NOT NULL,
    crawled_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_posts_site ON posts(site_id);
CREATE INDEX IF NOT EXISTS idx_posts_status ON posts(status);

-- External links found on posts
CREATE TABLE IF NOT EXISTS outgoing_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id INTEGER NOT NULL REFERENCES posts(id),
    site_id INTEGER NOT NULL REFERENCES sites(id),
    url TEXT NOT NULL,
    domain TEXT NOT NULL,
    anchor_text TEXT,
    rel_attributes TEXT,
    target TEXT,
    link_location TEXT NOT NULL,
    is_article_link INTEGER NOT NULL,
    position_paragraph INTEGER NOT NULL DEFAULT 0,
    position_word INTEGER NOT NULL DEFAULT 0,
    found_at TEXT NOT NULL,
    UNIQUE(post_id, url)
);

CREATE INDEX IF NOT EXISTS idx_links_post ON outgoing_links(post_id);
CREATE INDEX IF NOT EXISTS idx_links_domain ON outgoing_links(domain);

-- One row per sitemap or link extraction run
CREATE TABLE IF NOT EXISTS crawl_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site_id INTEGER REFERENCES sites(id),
    crawl_type TEXT NOT NULL,
    status TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    new_posts_found INTEGER NOT NULL DEFAULT 0,
    new_links_found INTEGER NOT NULL DEFAULT 0,
    errors_count INTEGER NOT NULL DEFAULT 0
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
