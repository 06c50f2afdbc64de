//! Output module for console reports
//!
//! This module handles:
//! - Summarizing the sitemap phase per site
//! - Summarizing extraction batches
//! - Reading back statistics from the database

pub mod stats;

pub use stats::{
    load_statistics, print_batch_statistics, print_statistics, BatchStatistics,
    DatabaseStatistics,
};

use crate::sitemap::{CrawlOutcome, CrawlStatus, SiteRequest};

/// Prints one line per site for the sitemap phase
pub fn print_sitemap_report(sites: &[SiteRequest], outcomes: &[CrawlOutcome]) {
    println!("=== Sitemap Discovery ===\n");
    for (site, outcome) in sites.iter().zip(outcomes) {
        match outcome.status {
            CrawlStatus::Success => println!(
                "  {} -> {} ({} URLs)",
                site.url,
                outcome.sitemap_url.as_deref().unwrap_or("-"),
                outcome.total_urls()
            ),
            CrawlStatus::NoSitemap | CrawlStatus::Error => {
                println!("  {} -> {}: {}", site.url, outcome.status, outcome.message)
            }
        }
        if !outcome.nested_sitemaps.is_empty() {
            println!("    nested sitemaps (not fetched):");
            for nested in &outcome.nested_sitemaps {
                println!("      {}", nested);
            }
        }
    }

    let total: usize = outcomes.iter().map(|o| o.total_urls()).sum();
    println!("\n  Total post URLs: {}", total);
}
