//! Link extraction from fetched pages into the audit database

use linkscape::config::{Config, FetchConfig};
use linkscape::output::BatchStatistics;
use linkscape::storage::{PostStatus, SqliteStorage, Storage};
use linkscape::{CrawlOutcome, FetchClient, FetchStrategy, LinkLocation, Orchestrator, PageStatus};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE_PAGE: &str = r#"<html><body>
<nav><a href="https://navlink.example.net/">Nav</a></nav>
<article>
  <h1>Post title</h1>
  <p>Read <a href="https://research.example.org/paper" rel="nofollow noopener" target="_blank">the paper</a> today.</p>
  <p>See <a href="/blog/other">our other post</a> and <a href="https://www.facebook.com/share">share</a>.</p>
</article>
<h2><a href="https://tools.example.com/">Tools we use</a></h2>
<aside><a href="https://partner.example.net/">Partner</a></aside>
</body></html>"#;

/// Creates a configuration suitable for tests
fn test_config(db_path: &str) -> Config {
    let mut config = Config {
        fetch: FetchConfig {
            timeout_secs: 5,
            max_retries: 0,
            retry_delay_ms: 10,
            ..FetchConfig::default()
        },
        ..Config::default()
    };
    config.crawler.concurrency = 4;
    config.crawler.escalate = false;
    config.output.database_path = db_path.to_string();
    config
}

#[tokio::test]
async fn test_extract_and_store() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/blog/linked"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_PAGE))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("audit.db");
    let config = test_config(db_path.to_str().unwrap());

    let linked = format!("{}/blog/linked", base);
    let gone = format!("{}/blog/gone", base);

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    let site_id = storage.upsert_site(&base).unwrap();
    let outcome = CrawlOutcome::success(
        format!("{}/sitemap.xml", base),
        vec![linked.clone(), gone.clone()],
        "test".to_string(),
    );
    assert_eq!(storage.record_sitemap_outcome(site_id, &outcome).unwrap(), 2);

    let fetcher = Arc::new(FetchClient::new(&config.fetch).unwrap());
    let orchestrator = Orchestrator::from_config(fetcher, &config).unwrap();
    let results = orchestrator
        .extract_with_escalation(&[linked.clone(), gone.clone()])
        .await;

    assert_eq!(results.len(), 2);
    let page = &results[0];
    assert_eq!(page.url, linked);
    assert_eq!(page.status, PageStatus::Success);
    assert_eq!(page.strategy, FetchStrategy::Lightweight);

    // Internal, excluded and navigation links are not reported
    let urls: Vec<&str> = page.links.iter().map(|l| l.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://research.example.org/paper",
            "https://tools.example.com/",
            "https://partner.example.net/",
        ]
    );
    assert_eq!(page.total_links, 3);

    let paper = &page.links[0];
    assert_eq!(paper.location, LinkLocation::Article);
    assert!(paper.is_article_link);
    assert_eq!(paper.anchor_text, "the paper");
    assert_eq!(paper.rel_attributes.as_deref(), Some("nofollow,noopener"));
    assert_eq!(paper.target.as_deref(), Some("_blank"));
    assert_eq!(page.links[1].location, LinkLocation::Heading);
    assert_eq!(
        page.links[2].location,
        LinkLocation::Sidebar("aside".to_string())
    );

    assert_eq!(results[1].url, gone);
    assert_eq!(results[1].status, PageStatus::Error);
    assert_eq!(results[1].total_links, 0);

    let stats = BatchStatistics::from_results(&results);
    assert_eq!(stats.successful, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.rendered, 0);

    // Persist and read back
    for result in &results {
        let post = storage.get_post_by_url(&result.url).unwrap().unwrap();
        storage.record_page_links(post.id, result).unwrap();
    }

    let crawled = storage.get_posts(site_id, Some(PostStatus::Crawled)).unwrap();
    assert_eq!(crawled.len(), 1);
    assert_eq!(crawled[0].total_links, 3);
    assert_eq!(crawled[0].fetch_strategy.as_deref(), Some("lightweight"));

    let failed = storage.get_posts(site_id, Some(PostStatus::Error)).unwrap();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].error_message.is_some());

    let links = storage.get_links_for_post(crawled[0].id).unwrap();
    assert_eq!(links.len(), 3);
    assert_eq!(links[0].domain, "research.example.org");
    assert_eq!(links[0].link_location, LinkLocation::Article);
    assert_eq!(storage.count_links().unwrap(), 3);
}

#[tokio::test]
async fn test_rerun_replaces_links() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/blog/linked"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_PAGE))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("audit.db");
    let config = test_config(db_path.to_str().unwrap());
    let linked = format!("{}/blog/linked", base);

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    let site_id = storage.upsert_site(&base).unwrap();
    let outcome = CrawlOutcome::success(
        format!("{}/sitemap.xml", base),
        vec![linked.clone()],
        "test".to_string(),
    );
    storage.record_sitemap_outcome(site_id, &outcome).unwrap();
    let post = storage.get_post_by_url(&linked).unwrap().unwrap();

    let fetcher = Arc::new(FetchClient::new(&config.fetch).unwrap());
    let orchestrator = Orchestrator::from_config(fetcher, &config).unwrap();

    for _ in 0..2 {
        let results = orchestrator
            .extract_links(&[linked.clone()], FetchStrategy::Lightweight)
            .await;
        storage.record_page_links(post.id, &results[0]).unwrap();
    }

    assert_eq!(storage.get_links_for_post(post.id).unwrap().len(), 3);
    assert_eq!(storage.count_links().unwrap(), 3);
}
