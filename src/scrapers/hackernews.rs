//! Hacker News adapter.
//!
//! Uses the public Firebase API: an index endpoint listing top story ids,
//! and one detail endpoint per story. Details are fetched concurrently and
//! merged back in index order; failed or malformed details are skipped
//! without failing the batch.

use futures::future::join_all;
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};
use url::Url;

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::models::{Article, Author};
use crate::scrapers::{Scraper, SiteCheck};
use crate::transport::Transport;

pub const SITE_NAME: &str = "hackernews";

const WEB_BASE: &str = "https://news.ycombinator.com";
const API_BASE: &str = "https://hacker-news.firebaseio.com/v0";

/// Required keys in a story detail record.
const REQUIRED_FIELDS: [&str; 4] = ["id", "title", "by", "time"];

pub struct HackerNewsScraper {
    transport: Transport,
    web_base: String,
    api_base: String,
}

impl HackerNewsScraper {
    pub fn new() -> Self {
        Self::with_endpoints(WEB_BASE, API_BASE)
    }

    /// Point the adapter at alternate endpoints (mock servers in tests).
    pub fn with_endpoints(web_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        HackerNewsScraper {
            transport: Transport::new(),
            web_base: web_base.into(),
            api_base: api_base.into(),
        }
    }

    /// Fetch the ordered top-story id list, truncated to `limit`.
    ///
    /// An unreachable endpoint or undecodable body yields an empty list.
    async fn top_story_ids(&self, limit: usize) -> Vec<u64> {
        let url = format!("{}/topstories.json", self.api_base);
        let Some(body) = self.transport.fetch_text(&url).await else {
            return Vec::new();
        };

        match serde_json::from_str::<Vec<u64>>(&body) {
            Ok(mut ids) => {
                ids.truncate(limit);
                ids
            }
            Err(e) => {
                error!(error = %e, "failed to parse top story ids");
                Vec::new()
            }
        }
    }

    async fn story_detail(&self, story_id: u64) -> Option<Value> {
        let url = format!("{}/item/{}.json", self.api_base, story_id);
        let body = self.transport.fetch_text(&url).await?;

        match serde_json::from_str::<Value>(&body) {
            Ok(detail) => Some(detail),
            Err(e) => {
                error!(story_id, error = %e, "failed to parse story detail");
                None
            }
        }
    }

    /// Normalize one story record into an [`Article`].
    ///
    /// Records missing any of the required fields, or whose URLs cannot be
    /// constructed, are discarded with a warning.
    fn parse_story(&self, story: &Value) -> Option<Article> {
        let id = story.get("id").and_then(Value::as_u64);
        let title = story
            .get("title")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());
        let by = story
            .get("by")
            .and_then(Value::as_str)
            .filter(|b| !b.is_empty());
        let time = story.get("time").and_then(Value::as_i64);

        let (Some(id), Some(title), Some(by), Some(time)) = (id, title, by, time) else {
            warn!(story_id = ?story.get("id"), "story is missing required fields; skipping");
            return None;
        };

        let Some(timestamp) = chrono::DateTime::from_timestamp(time, 0) else {
            warn!(story_id = id, time, "story timestamp out of range; skipping");
            return None;
        };

        // The discussion page doubles as the article URL for self posts.
        let discussion = format!("{}/item?id={}", self.web_base, id);
        let Ok(source_url) = Url::parse(&discussion) else {
            warn!(story_id = id, url = %discussion, "could not build discussion URL; skipping");
            return None;
        };

        let url = match story.get("url").and_then(Value::as_str) {
            Some(external) => match Url::parse(external) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!(story_id = id, url = external, error = %e, "invalid story URL; skipping");
                    return None;
                }
            },
            None => Some(source_url.clone()),
        };

        let mut author = Author::new(by);
        author.profile_url = Url::parse(&format!("{}/user?id={}", self.web_base, by)).ok();

        let mut metadata = Map::new();
        metadata.insert(
            "type".to_string(),
            json!(story.get("type").and_then(Value::as_str).unwrap_or("story")),
        );
        metadata.insert("hn_id".to_string(), json!(id));

        Some(Article {
            id: id.to_string(),
            title: title.to_string(),
            url,
            // Ask HN / Show HN posts carry their body in `text`.
            content: story.get("text").and_then(Value::as_str).map(String::from),
            author,
            timestamp,
            score: Some(story.get("score").and_then(Value::as_i64).unwrap_or(0)),
            comments_count: story
                .get("descendants")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32,
            comments: Vec::new(),
            tags: Vec::new(),
            source_site: SITE_NAME.to_string(),
            source_url,
            metadata,
        })
    }
}

impl Default for HackerNewsScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scraper for HackerNewsScraper {
    fn site_name(&self) -> &'static str {
        SITE_NAME
    }

    fn base_url(&self) -> &str {
        &self.web_base
    }

    fn transport(&self) -> &Transport {
        &self.transport
    }

    fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    async fn scrape_articles(&self, limit: usize) -> Result<Vec<Article>, ScrapeError> {
        info!(limit, "fetching top stories");

        let story_ids = self.top_story_ids(limit).await;
        if story_ids.is_empty() {
            error!("failed to fetch story ids");
            return Ok(Vec::new());
        }

        // One concurrent detail fetch per id; `join_all` keeps index order,
        // so omitting failures never reorders the survivors.
        let details = join_all(story_ids.iter().map(|id| self.story_detail(*id))).await;

        let articles: Vec<Article> = details
            .iter()
            .zip(&story_ids)
            .filter_map(|(detail, id)| match detail {
                Some(story) => self.parse_story(story),
                None => {
                    warn!(story_id = id, "story detail fetch failed; skipping");
                    None
                }
            })
            .collect();

        info!(count = articles.len(), "parsed articles");
        Ok(articles)
    }

    async fn validate_site_specific(&self) -> SiteCheck {
        let index_url = format!("{}/topstories.json", self.api_base);
        let Some(body) = self.transport.fetch_text(&index_url).await else {
            return SiteCheck::critical("story index endpoint not accessible");
        };

        let ids: Vec<u64> = match serde_json::from_str(&body) {
            Ok(ids) => ids,
            Err(_) => return SiteCheck::critical("story index returned invalid JSON"),
        };

        let mut issues = Vec::new();
        if ids.is_empty() {
            issues.push("story index returned an empty list".to_string());
        } else if ids.len() < 10 {
            issues.push(format!(
                "story index returned unusually few stories: {}",
                ids.len()
            ));
        }

        let sample_story_id = ids.first().copied();
        if let Some(first) = sample_story_id {
            match self.story_detail(first).await {
                None => issues.push("story detail endpoint not accessible".to_string()),
                Some(detail) => {
                    let missing: Vec<&str> = REQUIRED_FIELDS
                        .iter()
                        .copied()
                        .filter(|key| detail.get(key).is_none())
                        .collect();
                    if !missing.is_empty() {
                        issues.push(format!("sample story missing fields: {}", missing.join(", ")));
                    }
                }
            }
        }

        let web = self.transport.fetch_text(&self.web_base).await;
        match &web {
            None => issues.push("web front page not accessible".to_string()),
            Some(body) if !body.contains("Hacker News") => {
                issues.push("web front page content appears to have changed".to_string());
            }
            _ => {}
        }

        if !issues.is_empty() {
            return SiteCheck::warning(issues.join("; "));
        }

        let mut data = Map::new();
        data.insert("api_stories_count".to_string(), json!(ids.len()));
        data.insert("sample_story_id".to_string(), json!(sample_story_id));
        data.insert("website_accessible".to_string(), json!(web.is_some()));
        SiteCheck::ok(data)
    }
}
