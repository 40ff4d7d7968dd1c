//! # News Harvest
//!
//! A multi-source scraping engine that fetches articles from heterogeneous
//! news sources, normalizes them into one unified schema, and reports
//! per-source success/failure statistics plus a built-in self-validation of
//! each source adapter.
//!
//! ## Architecture
//!
//! - [`transport`]: scoped HTTP client per adapter instance; all failures
//!   fold into "no data"
//! - [`scrapers`]: the pluggable [`scrapers::Scraper`] contract and the
//!   three source adapters (JSON API, embedded JSON blob, RSS feed)
//! - [`orchestrator`]: runs one adapter end-to-end (scrape or four-stage
//!   validation), capturing failures as data
//! - [`manager`]: site registry plus concurrent fan-out with
//!   order-preserving, failure-isolating aggregation
//! - [`models`]: the unified Article schema and result types
//! - [`outputs`]: JSON/CSV/summary writers consuming the aggregate results
//!
//! ## Usage
//!
//! ```sh
//! news_harvest --sites hackernews --limit 10
//! news_harvest --validate
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod orchestrator;
pub mod outputs;
pub mod scrapers;
pub mod transport;
pub mod utils;
