//! Sitemap discovery and expansion against a mock server

use linkscape::config::{FetchConfig, SitemapConfig};
use linkscape::sitemap::SitemapResolver;
use linkscape::{CrawlStatus, FetchClient, FetchStrategy, SiteRequest, SitemapCrawler};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client() -> Arc<FetchClient> {
    let config = FetchConfig {
        timeout_secs: 5,
        max_retries: 0,
        retry_delay_ms: 10,
        ..FetchConfig::default()
    };
    Arc::new(FetchClient::new(&config).unwrap())
}

fn test_sitemap_config() -> SitemapConfig {
    SitemapConfig {
        request_delay_ms: 0,
        ..SitemapConfig::default()
    }
}

fn urlset(locations: &[String]) -> String {
    let entries: String = locations
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

/// Mounts a GET handler returning `body` with status 200
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_resolver_tries_patterns_in_order() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    // The first candidate answers with HTML, which must not be accepted
    mount_page(&mock_server, "/sitemap.xml", "<html>Not here</html>".to_string()).await;
    mount_page(&mock_server, "/wp-sitemap.xml", urlset(&[format!("{}/blog/a", base)])).await;

    let resolver = SitemapResolver::new(
        test_client(),
        FetchStrategy::Lightweight,
        vec!["/sitemap.xml".to_string(), "/wp-sitemap.xml".to_string()],
    );

    let found = resolver.discover(&base, &[]).await.unwrap();
    assert_eq!(found, Some(format!("{}/wp-sitemap.xml", base)));
}

#[tokio::test]
async fn test_resolver_falls_back_to_robots() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_page(
        &mock_server,
        "/robots.txt",
        format!("User-agent: *\nDisallow: /admin\nSitemap: {}/feeds/posts.xml\n", base),
    )
    .await;
    mount_page(&mock_server, "/feeds/posts.xml", urlset(&[format!("{}/blog/a", base)])).await;

    let resolver = SitemapResolver::new(
        test_client(),
        FetchStrategy::Lightweight,
        vec!["/sitemap.xml".to_string()],
    );

    let found = resolver.discover(&base, &[]).await.unwrap();
    assert_eq!(found, Some(format!("{}/feeds/posts.xml", base)));
}

#[tokio::test]
async fn test_resolver_nothing_found() {
    let mock_server = MockServer::start().await;

    let resolver = SitemapResolver::new(
        test_client(),
        FetchStrategy::Lightweight,
        vec!["/sitemap.xml".to_string()],
    );

    let found = resolver.discover(&mock_server.uri(), &[]).await.unwrap();
    assert_eq!(found, None);
}

#[tokio::test]
async fn test_crawl_site_end_to_end() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let host = base.trim_start_matches("http://").to_string();

    mount_page(
        &mock_server,
        "/robots.txt",
        format!("Sitemap: {}/feeds/posts.xml\n", base),
    )
    .await;
    mount_page(
        &mock_server,
        "/feeds/posts.xml",
        urlset(&[
            format!("{}/blog/first-post", base),
            format!("{}/category/news/", base),
            format!("{}/blog/second-post", base),
            format!("{}/about", base),
            format!("{}/blog/first-post", base),
        ]),
    )
    .await;

    let crawler = SitemapCrawler::new(test_client(), &test_sitemap_config()).unwrap();
    let outcome = crawler.crawl_site(&SiteRequest::new(&base)).await;

    assert_eq!(outcome.status, CrawlStatus::Success);
    assert_eq!(outcome.sitemap_url, Some(format!("{}/feeds/posts.xml", base)));
    // Leaf URLs are upgraded to HTTPS, archive pages dropped, duplicates removed
    assert_eq!(
        outcome.urls,
        vec![
            format!("https://{}/blog/first-post", host),
            format!("https://{}/blog/second-post", host),
        ]
    );
}

#[tokio::test]
async fn test_crawl_site_known_sitemap_unreachable() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let crawler = SitemapCrawler::new(test_client(), &test_sitemap_config()).unwrap();
    let request = SiteRequest::new(&base).with_sitemap(format!("{}/sitemap.xml", base));
    let outcome = crawler.crawl_site(&request).await;

    assert_eq!(outcome.status, CrawlStatus::Error);
    assert!(outcome.urls.is_empty());
    assert!(outcome.message.contains("500"));
}

#[tokio::test]
async fn test_crawl_sites_mixed() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_page(
        &mock_server,
        "/sitemap.xml",
        urlset(&[format!("{}/blog/live-post", base)]),
    )
    .await;

    let manual = urlset(&["http://static.example.com/news/pasted".to_string()]);
    let requests = vec![
        SiteRequest::new(&base),
        SiteRequest::new("static.example.com").with_manual_xml(manual),
    ];

    let crawler = SitemapCrawler::new(test_client(), &test_sitemap_config()).unwrap();
    let outcomes = crawler.crawl_sites(&requests, 2).await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].status, CrawlStatus::Success);
    assert_eq!(outcomes[0].total_urls(), 1);
    assert_eq!(outcomes[1].status, CrawlStatus::Success);
    assert_eq!(
        outcomes[1].urls,
        vec!["https://static.example.com/news/pasted".to_string()]
    );
    assert_eq!(
        outcomes[1].sitemap_url.as_deref(),
        Some("https://static.example.com/sitemap.xml")
    );
}
