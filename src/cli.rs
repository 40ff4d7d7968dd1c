//! Command-line interface definitions.
//!
//! All options have configuration-backed defaults, so the binary runs with
//! no arguments at all (scraping every enabled site).

use std::path::PathBuf;

use clap::Parser;

use crate::config::OutputFormat;

/// Scrape articles from heterogeneous news sources into one unified schema.
///
/// # Examples
///
/// ```sh
/// # Scrape ten Hacker News stories to a JSON file
/// news_harvest --sites hackernews --limit 10 --output data.json
///
/// # Scrape all enabled sites, write JSON + CSV + summary
/// news_harvest --format both
///
/// # Probe every adapter's health instead of scraping
/// news_harvest --validate
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Sites to scrape (repeatable; defaults to the enabled sites from
    /// configuration)
    #[arg(short, long)]
    pub sites: Vec<String>,

    /// Maximum number of articles per site
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output file path (defaults to a timestamped name in the output
    /// directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Run adapter self-validation instead of scraping
    #[arg(long)]
    pub validate: bool,

    /// List available sites and exit
    #[arg(long)]
    pub list_sites: bool,

    /// Path to the YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}
