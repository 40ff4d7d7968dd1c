//! Yahoo! News Japan adapter.
//!
//! Reads the fixed top-picks RSS feed. Items missing any required field or
//! with an unparseable publication date are rejected individually (logged
//! and skipped) without failing the batch.
//!
//! This adapter opts into the offline connectivity fallback with a canned
//! minimal feed: RSS is format-stable, so the self-validation stays
//! meaningful when no live network is available.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::{Map, json};
use tracing::{error, info, warn};
use url::Url;

use crate::error::ScrapeError;
use crate::models::{Article, Author};
use crate::scrapers::{Scraper, SiteCheck};
use crate::transport::Transport;

pub const SITE_NAME: &str = "yahoo_news_japan";

const BASE_URL: &str = "https://news.yahoo.co.jp";
const FEED_PATH: &str = "/rss/topics/top-picks.xml";

/// Feed-level byline; the feed does not attribute individual authors.
const FEED_AUTHOR: &str = "Yahoo!ニュース";

/// Canned feed served to the connectivity check when the live fetch fails.
const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Yahoo!ニュース・トピックス - 主要</title>
    <link>https://news.yahoo.co.jp/</link>
    <item>
      <title>サンプル記事</title>
      <link>https://news.yahoo.co.jp/pickup/sample001</link>
      <pubDate>Mon, 06 Jan 2025 09:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>
"#;

/// One `<item>`'s raw fields, before required-field checks.
#[derive(Debug, Default, Clone)]
struct FeedItem {
    title: String,
    link: String,
    pub_date: String,
}

pub struct YahooNewsJapanScraper {
    transport: Transport,
    base_url: String,
}

impl YahooNewsJapanScraper {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the adapter at an alternate site root (mock servers in tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        YahooNewsJapanScraper {
            transport: Transport::new(),
            base_url: base_url.into(),
        }
    }

    fn feed_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), FEED_PATH)
    }

    /// Collect `<item>` elements from feed XML.
    fn parse_feed_items(xml: &str) -> Result<Vec<FeedItem>, quick_xml::Error> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut items = Vec::new();
        let mut current: Option<FeedItem> = None;
        let mut current_tag = String::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if name == "item" {
                        current = Some(FeedItem::default());
                    }
                    current_tag = name;
                }
                Event::End(e) => {
                    if e.name().as_ref() == b"item" {
                        if let Some(item) = current.take() {
                            items.push(item);
                        }
                    }
                    current_tag.clear();
                }
                Event::Text(e) => {
                    if let Some(item) = current.as_mut() {
                        let text = e.xml_content().unwrap_or_default().into_owned();
                        append_field(item, &current_tag, &text);
                    }
                }
                Event::CData(e) => {
                    if let Some(item) = current.as_mut() {
                        let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                        append_field(item, &current_tag, &text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(items)
    }

    /// Normalize one feed item, rejecting it on any required-field failure.
    fn item_to_article(&self, item: &FeedItem) -> Option<Article> {
        if item.title.is_empty() || item.link.is_empty() || item.pub_date.is_empty() {
            warn!(link = %item.link, "feed item is missing required fields; skipping");
            return None;
        }

        let url = match Url::parse(&item.link) {
            Ok(url) => url,
            Err(e) => {
                warn!(link = %item.link, error = %e, "invalid item link; skipping");
                return None;
            }
        };

        // Id from the last non-empty path segment, or the whole link.
        let id = url
            .path_segments()
            .and_then(|segments| {
                segments
                    .filter(|segment| !segment.is_empty())
                    .last()
                    .map(String::from)
            })
            .unwrap_or_else(|| item.link.clone());

        let timestamp = match DateTime::parse_from_rfc2822(&item.pub_date) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(e) => {
                warn!(pub_date = %item.pub_date, error = %e, "unparseable pubDate; skipping");
                return None;
            }
        };

        Some(Article {
            id,
            title: item.title.clone(),
            url: Some(url.clone()),
            content: None,
            author: Author::new(FEED_AUTHOR),
            timestamp,
            score: None,
            comments_count: 0,
            comments: Vec::new(),
            tags: Vec::new(),
            source_site: SITE_NAME.to_string(),
            source_url: url,
            metadata: Map::new(),
        })
    }
}

fn append_field(item: &mut FeedItem, tag: &str, text: &str) {
    match tag {
        "title" => item.title.push_str(text),
        "link" => item.link.push_str(text),
        "pubDate" => item.pub_date.push_str(text),
        _ => {}
    }
}

impl Default for YahooNewsJapanScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scraper for YahooNewsJapanScraper {
    fn site_name(&self) -> &'static str {
        SITE_NAME
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport(&self) -> &Transport {
        &self.transport
    }

    fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    async fn scrape_articles(&self, limit: usize) -> Result<Vec<Article>, ScrapeError> {
        let feed_url = self.feed_url();
        info!(limit, url = %feed_url, "fetching feed");

        let Some(xml) = self.transport.fetch_text(&feed_url).await else {
            error!("failed to fetch feed");
            return Ok(Vec::new());
        };

        let items = match Self::parse_feed_items(&xml) {
            Ok(items) => items,
            Err(e) => {
                error!(error = %e, "failed to parse feed XML");
                return Ok(Vec::new());
            }
        };

        let articles: Vec<Article> = items
            .iter()
            .take(limit)
            .filter_map(|item| self.item_to_article(item))
            .collect();

        info!(count = articles.len(), "parsed articles");
        Ok(articles)
    }

    async fn validate_site_specific(&self) -> SiteCheck {
        let Some(xml) = self.transport.fetch_text(&self.feed_url()).await else {
            return SiteCheck::critical("RSS feed not accessible");
        };

        let items = match Self::parse_feed_items(&xml) {
            Ok(items) => items,
            Err(_) => return SiteCheck::critical("invalid RSS XML"),
        };
        if items.is_empty() {
            return SiteCheck::critical("no items in RSS feed");
        }

        let Some(sample) = items.first().and_then(|item| self.item_to_article(item)) else {
            return SiteCheck::critical("failed to parse sample feed item");
        };

        let mut data = Map::new();
        data.insert("items_count".to_string(), json!(items.len()));
        data.insert("sample_id".to_string(), json!(sample.id));
        SiteCheck::ok(data)
    }

    fn connectivity_fallback_sample(&self) -> Option<String> {
        Some(SAMPLE_FEED.to_string())
    }
}
