//! Statistics for extraction batches and the audit database
//!
//! This module provides functionality for summarizing a finished batch and
//! for extracting and displaying statistics from the storage layer.

use crate::crawler::PageLinks;
use crate::fetch::FetchStrategy;
use crate::storage::{PostStatus, Storage};
use crate::LinkscapeError;

/// Number of domains listed in the database report
pub const TOP_DOMAINS: usize = 10;

/// Summary of one extraction batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchStatistics {
    /// Pages processed (one per distinct URL)
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    /// Links across all successful pages
    pub total_links: usize,
    /// `total_links / successful`, 0 when nothing succeeded
    pub average_links: f64,
    /// Pages whose final result came from the browser strategy
    pub rendered: usize,
}

impl BatchStatistics {
    pub fn from_results(results: &[PageLinks]) -> Self {
        let successful = results.iter().filter(|page| page.is_success()).count();
        let total_links: usize = results
            .iter()
            .filter(|page| page.is_success())
            .map(|page| page.total_links)
            .sum();
        let rendered = results
            .iter()
            .filter(|page| page.strategy == FetchStrategy::Browser)
            .count();

        let average_links = if successful > 0 {
            total_links as f64 / successful as f64
        } else {
            0.0
        };

        Self {
            total_processed: results.len(),
            successful,
            failed: results.len() - successful,
            total_links,
            average_links,
            rendered,
        }
    }
}

/// Statistics read back from the database
#[derive(Debug, Clone)]
pub struct DatabaseStatistics {
    pub sites: u64,
    pub posts_pending: u64,
    pub posts_crawled: u64,
    pub posts_error: u64,
    pub total_links: u64,
    /// Most linked external domains with their link counts
    pub top_domains: Vec<(String, u64)>,
}

impl DatabaseStatistics {
    pub fn total_posts(&self) -> u64 {
        self.posts_pending + self.posts_crawled + self.posts_error
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<DatabaseStatistics, LinkscapeError> {
    Ok(DatabaseStatistics {
        sites: storage.count_sites()?,
        posts_pending: storage.count_posts_by_status(PostStatus::Pending)?,
        posts_crawled: storage.count_posts_by_status(PostStatus::Crawled)?,
        posts_error: storage.count_posts_by_status(PostStatus::Error)?,
        total_links: storage.count_links()?,
        top_domains: storage.top_linked_domains(TOP_DOMAINS)?,
    })
}

/// Prints a batch summary to stdout
pub fn print_batch_statistics(stats: &BatchStatistics) {
    println!("=== Extraction Summary ===\n");
    println!("  Pages processed: {}", stats.total_processed);
    println!("  Successful: {}", stats.successful);
    println!("  Failed: {}", stats.failed);
    println!("  Rendered with browser: {}", stats.rendered);
    println!("  Total links found: {}", stats.total_links);
    println!("  Average links per page: {:.1}", stats.average_links);
}

/// Prints database statistics to stdout in a formatted manner
pub fn print_statistics(stats: &DatabaseStatistics) {
    println!("=== Audit Statistics ===\n");

    println!("Overview:");
    println!("  Sites: {}", stats.sites);
    println!("  Posts: {}", stats.total_posts());
    println!("  Outgoing links: {}", stats.total_links);
    println!();

    println!("Posts by Status:");
    let total = stats.total_posts();
    for (label, count) in [
        ("pending", stats.posts_pending),
        ("crawled", stats.posts_crawled),
        ("error", stats.posts_error),
    ] {
        let percentage = if total > 0 {
            (count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", label, count, percentage);
    }
    println!();

    if !stats.top_domains.is_empty() {
        println!("Top Linked Domains:");
        for (domain, count) in &stats.top_domains {
            println!("  {} ({})", domain, count);
        }
    }
}
