//! End-to-end scraping tests against local mock servers.
//!
//! Uses `wiremock` to stand up an HTTP server per test so no real network
//! traffic is made. Covers the batch-level properties: index truncation,
//! per-item failure absorption, URL synthesis, order preservation under
//! mixed outcomes, unknown-site isolation, and the all-or-nothing policy.

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use news_harvest::error::ScrapeError;
use news_harvest::manager::ScraperManager;
use news_harvest::models::Article;
use news_harvest::orchestrator::scrape_one;
use news_harvest::scrapers::hackernews::HackerNewsScraper;
use news_harvest::scrapers::reuters_japan::ReutersJapanScraper;
use news_harvest::scrapers::yahoo_news_japan::YahooNewsJapanScraper;
use news_harvest::scrapers::{Scraper, SiteCheck};
use news_harvest::transport::Transport;

fn story(id: u64) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Story {id}"),
        "by": "tester",
        "time": 1736154000,
        "score": 42,
        "descendants": 7,
        "type": "story"
    })
}

async fn mount_story(server: &MockServer, id: u64, body: &serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/item/{id}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Index [1,2,3,4,5], limit 3, detail 2 fails: ids 1 and 3 survive, in
// order, with no batch error recorded.
// ---------------------------------------------------------------------------

#[tokio::test]
async fn detail_failures_are_absorbed_without_batch_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topstories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([1, 2, 3, 4, 5])))
        .mount(&server)
        .await;
    mount_story(&server, 1, &story(1)).await;
    Mock::given(method("GET"))
        .and(path("/item/2.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_story(&server, 3, &story(3)).await;
    // Beyond the limit: must never be fetched.
    Mock::given(method("GET"))
        .and(path("/item/4.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&story(4)))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/item/5.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&story(5)))
        .expect(0)
        .mount(&server)
        .await;

    let mut scraper = HackerNewsScraper::with_endpoints(server.uri(), server.uri());
    let result = scrape_one(&mut scraper, 3).await;

    assert_eq!(result.error_count, 0, "errors: {:?}", result.errors);
    assert_eq!(result.success_count, 2);
    let ids: Vec<&str> = result.articles.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

// ---------------------------------------------------------------------------
// A story with no external link gets the synthesized discussion URL as
// both `url` and `source_url`.
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_external_link_synthesizes_discussion_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topstories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([7])))
        .mount(&server)
        .await;
    mount_story(&server, 7, &story(7)).await;

    let mut scraper = HackerNewsScraper::with_endpoints(server.uri(), server.uri());
    let result = scrape_one(&mut scraper, 1).await;

    let article = &result.articles[0];
    let expected = format!("{}/item?id=7", server.uri());
    assert_eq!(article.url.as_ref().unwrap().as_str(), expected);
    assert_eq!(article.source_url.as_str(), expected);
}

// ---------------------------------------------------------------------------
// An unreachable index endpoint yields a zero-article success, not an
// error: scraping failure surfaces through validation, not the batch.
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_index_yields_empty_success() {
    let server = MockServer::start().await;

    let mut scraper = HackerNewsScraper::with_endpoints(server.uri(), server.uri());
    let result = scrape_one(&mut scraper, 3).await;

    assert_eq!(result.success_count, 0);
    assert_eq!(result.error_count, 0);
    assert!(result.articles.is_empty());
}

// ---------------------------------------------------------------------------
// Reuters: embedded blob extraction through a real HTTP round trip.
// ---------------------------------------------------------------------------

fn reuters_record(id: u32) -> serde_json::Value {
    json!({
        "id": format!("R{id}"),
        "basic_headline": format!("Headline {id}"),
        "canonical_url": format!("/markets/r{id}/"),
        "display_date": "2025-01-06T09:00:00Z"
    })
}

#[tokio::test]
async fn reuters_scrapes_records_from_embedded_blob() {
    let server = MockServer::start().await;

    let records: Vec<serde_json::Value> = (1..=4).map(reuters_record).collect();
    let blob = json!({"result": {"articles": records}});
    let page = format!(
        "<html><body>Reuters<script>Fusion.globalContent = {blob};</script></body></html>"
    );

    Mock::given(method("GET"))
        .and(path("/markets/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let mut scraper = ReutersJapanScraper::with_base_url(server.uri());
    let result = scrape_one(&mut scraper, 2).await;

    assert_eq!(result.success_count, 2);
    assert_eq!(result.articles[0].id, "R1");
    assert_eq!(result.articles[1].id, "R2");
    let url = result.articles[0].url.as_ref().unwrap();
    assert_eq!(url.as_str(), format!("{}/markets/r1/", server.uri()));
}

// ---------------------------------------------------------------------------
// Yahoo: RSS items through a real HTTP round trip, truncated to limit.
// ---------------------------------------------------------------------------

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
  <title>Topics</title>
  <item>
    <title>First</title>
    <link>https://news.yahoo.co.jp/pickup/first</link>
    <pubDate>Mon, 06 Jan 2025 09:00:00 GMT</pubDate>
  </item>
  <item>
    <title>Second</title>
    <link>https://news.yahoo.co.jp/pickup/second</link>
    <pubDate>Mon, 06 Jan 2025 10:00:00 GMT</pubDate>
  </item>
  <item>
    <title>Third</title>
    <link>https://news.yahoo.co.jp/pickup/third</link>
    <pubDate>Mon, 06 Jan 2025 11:00:00 GMT</pubDate>
  </item>
</channel></rss>"#;

#[tokio::test]
async fn yahoo_truncates_feed_items_to_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rss/topics/top-picks.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
        .mount(&server)
        .await;

    let mut scraper = YahooNewsJapanScraper::with_base_url(server.uri());
    let result = scrape_one(&mut scraper, 2).await;

    assert_eq!(result.success_count, 2);
    assert_eq!(result.articles[0].id, "first");
    assert_eq!(result.articles[1].id, "second");
}

// ---------------------------------------------------------------------------
// Fan-out through the manager: order preservation and failure isolation
// with a mock-backed adapter, an erroring adapter, and an unknown site.
// ---------------------------------------------------------------------------

struct ExplodingScraper {
    transport: Transport,
}

#[async_trait]
impl Scraper for ExplodingScraper {
    fn site_name(&self) -> &'static str {
        "exploding"
    }

    fn base_url(&self) -> &str {
        "http://127.0.0.1:9/"
    }

    fn transport(&self) -> &Transport {
        &self.transport
    }

    fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    async fn scrape_articles(&self, _limit: usize) -> Result<Vec<Article>, ScrapeError> {
        Err(ScrapeError::adapter("exploding", "kaboom"))
    }

    async fn validate_site_specific(&self) -> SiteCheck {
        SiteCheck::critical("kaboom")
    }
}

#[tokio::test]
async fn fan_out_preserves_order_and_isolates_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topstories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([1])))
        .mount(&server)
        .await;
    mount_story(&server, 1, &story(1)).await;

    let mut manager = ScraperManager::new();
    let uri = server.uri();
    manager.register("hackernews", move || {
        Box::new(HackerNewsScraper::with_endpoints(uri.clone(), uri.clone()))
    });
    manager.register("exploding", || {
        Box::new(ExplodingScraper {
            transport: Transport::new(),
        })
    });

    let sites: Vec<String> = ["exploding", "unknown_x", "hackernews"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let results = manager.scrape_many(&sites, 5).await;

    assert_eq!(results.len(), 3);
    let order: Vec<&str> = results.iter().map(|r| r.site.as_str()).collect();
    assert_eq!(order, vec!["exploding", "unknown_x", "hackernews"]);

    // All-or-nothing failure for the erroring adapter.
    assert_eq!(results[0].error_count, 1);
    assert!(results[0].articles.is_empty());
    assert!(results[0].errors[0].contains("kaboom"));

    // Unknown site is synthesized without contaminating its neighbors.
    assert_eq!(results[1].error_count, 1);
    assert!(results[1].errors[0].contains("Unknown site: unknown_x"));

    assert_eq!(results[2].error_count, 0);
    assert_eq!(results[2].success_count, 1);
}
