//! Site registry and concurrent fan-out.
//!
//! One task per requested site, each owning its own adapter instance and
//! transport, so sites share no mutable state. Results are assembled in
//! the input order regardless of completion order, and one site's failure
//! can never contaminate another's result or abort the batch: unknown
//! sites are synthesized as failures before any task launches, adapter
//! failures come back as captured data from the orchestrator, and a task
//! that panics is converted to a failure entry at join time.

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::models::{ScrapingResult, ValidationResult};
use crate::orchestrator::{scrape_one, validate_one};
use crate::scrapers::hackernews::{self, HackerNewsScraper};
use crate::scrapers::reuters_japan::{self, ReutersJapanScraper};
use crate::scrapers::yahoo_news_japan::{self, YahooNewsJapanScraper};
use crate::scrapers::Scraper;

type ScraperFactory = Box<dyn Fn() -> Box<dyn Scraper> + Send + Sync>;

/// A per-site unit of fan-out work: either a synthesized unknown-site
/// failure or a spawned task to join.
enum Job<T> {
    Unknown(String),
    Spawned(String, JoinHandle<T>),
}

pub struct ScraperManager {
    factories: Vec<(String, ScraperFactory)>,
}

impl ScraperManager {
    /// A manager with the builtin sites registered, in stable order.
    pub fn new() -> Self {
        let mut manager = ScraperManager {
            factories: Vec::new(),
        };
        manager.register(hackernews::SITE_NAME, || Box::new(HackerNewsScraper::new()));
        manager.register(reuters_japan::SITE_NAME, || {
            Box::new(ReutersJapanScraper::new())
        });
        manager.register(yahoo_news_japan::SITE_NAME, || {
            Box::new(YahooNewsJapanScraper::new())
        });
        manager
    }

    /// Register (or replace) an adapter factory for a site name.
    pub fn register<F>(&mut self, site: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Scraper> + Send + Sync + 'static,
    {
        let site = site.into();
        self.factories.retain(|(name, _)| name != &site);
        self.factories.push((site, Box::new(factory)));
    }

    pub fn available_sites(&self) -> Vec<String> {
        self.factories.iter().map(|(name, _)| name.clone()).collect()
    }

    fn make_scraper(&self, site: &str) -> Option<Box<dyn Scraper>> {
        self.factories
            .iter()
            .find(|(name, _)| name == site)
            .map(|(_, factory)| factory())
    }

    /// Scrape a single site; unknown names yield a synthesized failure.
    pub async fn scrape_site(&self, site: &str, limit: usize) -> ScrapingResult {
        match self.make_scraper(site) {
            Some(mut scraper) => scrape_one(scraper.as_mut(), limit).await,
            None => {
                error!(site, "unknown site");
                ScrapingResult::failure(site, Utc::now(), format!("Unknown site: {site}"))
            }
        }
    }

    /// Validate a single site; unknown names yield a synthesized failure.
    pub async fn validate_site(&self, site: &str) -> ValidationResult {
        match self.make_scraper(site) {
            Some(mut scraper) => validate_one(scraper.as_mut()).await,
            None => {
                error!(site, "unknown site");
                ValidationResult::invalid(site, Utc::now(), format!("Unknown site: {site}"))
            }
        }
    }

    /// Scrape all requested sites concurrently; the result order matches
    /// the input order.
    pub async fn scrape_many(&self, sites: &[String], limit: usize) -> Vec<ScrapingResult> {
        info!(?sites, limit, "starting concurrent scrape");

        let jobs: Vec<Job<ScrapingResult>> = sites
            .iter()
            .map(|site| match self.make_scraper(site) {
                Some(mut scraper) => Job::Spawned(
                    site.clone(),
                    tokio::spawn(async move { scrape_one(scraper.as_mut(), limit).await }),
                ),
                None => Job::Unknown(site.clone()),
            })
            .collect();

        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            match job {
                Job::Unknown(site) => {
                    error!(site = %site, "unknown site");
                    results.push(ScrapingResult::failure(
                        &site,
                        Utc::now(),
                        format!("Unknown site: {site}"),
                    ));
                }
                Job::Spawned(site, handle) => match handle.await {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        error!(site = %site, error = %e, "scrape task failed");
                        results.push(ScrapingResult::failure(
                            &site,
                            Utc::now(),
                            format!("Scrape task failed: {e}"),
                        ));
                    }
                },
            }
        }

        let total_articles: usize = results.iter().map(|r| r.success_count).sum();
        let total_errors: usize = results.iter().map(|r| r.error_count).sum();
        info!(total_articles, total_errors, "scrape batch completed");

        results
    }

    /// Validate all requested sites concurrently; the result order matches
    /// the input order.
    pub async fn validate_many(&self, sites: &[String]) -> Vec<ValidationResult> {
        info!(?sites, "starting concurrent validation");

        let jobs: Vec<Job<ValidationResult>> = sites
            .iter()
            .map(|site| match self.make_scraper(site) {
                Some(mut scraper) => Job::Spawned(
                    site.clone(),
                    tokio::spawn(async move { validate_one(scraper.as_mut()).await }),
                ),
                None => Job::Unknown(site.clone()),
            })
            .collect();

        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            match job {
                Job::Unknown(site) => {
                    error!(site = %site, "unknown site");
                    results.push(ValidationResult::invalid(
                        &site,
                        Utc::now(),
                        format!("Unknown site: {site}"),
                    ));
                }
                Job::Spawned(site, handle) => match handle.await {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        error!(site = %site, error = %e, "validation task failed");
                        results.push(ValidationResult::invalid(
                            &site,
                            Utc::now(),
                            format!("Validation task failed: {e}"),
                        ));
                    }
                },
            }
        }

        let valid = results.iter().filter(|r| r.is_valid).count();
        info!(valid, total = results.len(), "validation batch completed");

        results
    }
}

impl Default for ScraperManager {
    fn default() -> Self {
        Self::new()
    }
}
