//! Linkscape main entry point
//!
//! This is the command-line interface for the Linkscape outbound link auditor.

use anyhow::Context;
use clap::Parser;
use linkscape::config::{load_config_with_hash, Config};
use linkscape::crawler::{Orchestrator, PageLinks, ProgressCallback};
use linkscape::fetch::FetchClient;
use linkscape::output::{
    load_statistics, print_batch_statistics, print_sitemap_report, print_statistics,
    BatchStatistics,
};
use linkscape::sitemap::{CrawlStatus, SiteRequest, SitemapCrawler};
use linkscape::storage::{
    open_storage, CrawlTotals, CrawlType, PostStatus, RunStatus, SqliteStorage, Storage,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Linkscape: sitemap-driven outbound link auditor
///
/// Linkscape discovers each configured site's posts through its sitemaps,
/// then fetches every post and records the external links it contains.
/// Pages that fail or yield no links are retried with a headless browser.
#[derive(Parser, Debug)]
#[command(name = "linkscape")]
#[command(version)]
#[command(about = "Sitemap-driven outbound link auditor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Stop after the sitemap phase
    #[arg(long)]
    sitemaps_only: bool,

    /// Never re-fetch pages with the browser
    #[arg(long)]
    no_escalation: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&cli, config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkscape=info,warn"),
            1 => EnvFilter::new("linkscape=debug,info"),
            2 => EnvFilter::new("linkscape=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Linkscape Dry Run ===\n");

    println!("Fetch:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!(
        "  Retries: {} (base delay {}ms)",
        config.fetch.max_retries, config.fetch.retry_delay_ms
    );
    if let Some(dir) = &config.fetch.screenshot_dir {
        println!("  Screenshots: {}", dir);
    }

    println!("\nSitemap:");
    println!("  Path candidates: {}", config.sitemap.patterns.len());
    println!("  Custom candidates: {}", config.sitemap.custom_patterns.len());
    println!("  Post patterns: {}", config.sitemap.post_patterns.join(", "));
    println!(
        "  Exclude patterns: {}",
        config.sitemap.exclude_patterns.join(", ")
    );
    println!(
        "  Strategy: {}",
        if config.sitemap.use_browser {
            "browser"
        } else {
            "lightweight"
        }
    );

    println!("\nExtraction:");
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Browser escalation: {}", config.crawler.escalate);
    println!("  Excluded domains: {}", config.links.excluded_domains.len());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nSites ({}):", config.sites.len());
    for site in &config.sites {
        match (&site.sitemap, &site.manual_xml) {
            (_, Some(xml)) => println!("  - {} (manual XML: {})", site.url, xml),
            (Some(sitemap), None) => println!("  - {} (sitemap: {})", site.url, sitemap),
            (None, None) => println!("  - {} (discover sitemap)", site.url),
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Builds the site requests, reading manual XML files relative to the config file
fn site_requests(config: &Config, config_path: &Path) -> anyhow::Result<Vec<SiteRequest>> {
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));

    config
        .sites
        .iter()
        .map(|site| {
            let mut request = SiteRequest::new(&site.url);
            if let Some(sitemap) = &site.sitemap {
                request = request.with_sitemap(sitemap);
            }
            if let Some(xml_path) = &site.manual_xml {
                let path = base.join(xml_path);
                let xml = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read manual XML {}", path.display()))?;
                request = request.with_manual_xml(xml);
            }
            Ok::<_, anyhow::Error>(request)
        })
        .collect()
}

/// Handles the main crawl: sitemap phase, then link extraction
async fn handle_crawl(cli: &Cli, config: Config, config_hash: &str) -> anyhow::Result<()> {
    let requests = site_requests(&config, &cli.config)?;
    if requests.is_empty() {
        tracing::warn!("No [[site]] entries configured, nothing to do");
        return Ok(());
    }

    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    let fetcher = Arc::new(FetchClient::new(&config.fetch).context("Failed to build HTTP client")?);

    // Sitemap phase
    let crawler = SitemapCrawler::new(fetcher.clone(), &config.sitemap)?;
    let crawl_id = storage.start_crawl(None, CrawlType::Sitemap, config_hash)?;
    let outcomes = crawler
        .crawl_sites(&requests, config.crawler.concurrency as usize)
        .await;

    let mut totals = CrawlTotals::default();
    let mut site_ids = Vec::new();
    for (request, outcome) in requests.iter().zip(&outcomes) {
        let site_id = storage.upsert_site(&request.url)?;
        totals.new_posts_found += storage.record_sitemap_outcome(site_id, outcome)?;
        if outcome.status == CrawlStatus::Error {
            totals.errors_count += 1;
        }
        if outcome.status == CrawlStatus::Success {
            site_ids.push(site_id);
        }
    }
    storage.complete_crawl(crawl_id, RunStatus::Completed, totals)?;

    if !cli.quiet {
        print_sitemap_report(&requests, &outcomes);
    }

    if cli.sitemaps_only {
        return Ok(());
    }

    // Link extraction phase
    let progress: ProgressCallback = Arc::new(|done: usize, total: usize, url: &str| {
        tracing::info!("[{}/{}] {}", done, total, url);
    });
    let orchestrator = Orchestrator::from_config(fetcher, &config)?
        .with_escalation(config.crawler.escalate && !cli.no_escalation)
        .with_progress(progress);

    let mut all_results: Vec<PageLinks> = Vec::new();
    for site_id in site_ids {
        let posts: Vec<_> = storage
            .get_posts(site_id, None)?
            .into_iter()
            .filter(|post| post.status != PostStatus::Crawled)
            .collect();
        if posts.is_empty() {
            continue;
        }

        let crawl_id = storage.start_crawl(Some(site_id), CrawlType::Links, config_hash)?;
        let post_ids: HashMap<String, i64> =
            posts.iter().map(|post| (post.url.clone(), post.id)).collect();
        let urls: Vec<String> = posts.into_iter().map(|post| post.url).collect();

        let results = orchestrator.extract_with_escalation(&urls).await;

        let mut totals = CrawlTotals::default();
        for page in &results {
            let Some(post_id) = post_ids.get(&page.url) else {
                continue;
            };
            totals.new_links_found += storage.record_page_links(*post_id, page)?;
            if !page.is_success() {
                totals.errors_count += 1;
            }
        }
        storage.complete_crawl(crawl_id, RunStatus::Completed, totals)?;

        all_results.extend(results);
    }

    if !cli.quiet {
        println!();
        print_batch_statistics(&BatchStatistics::from_results(&all_results));
    }

    Ok(())
}
