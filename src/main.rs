//! Binary entry point: CLI parsing, configuration, batch execution, export.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use news_harvest::cli::Cli;
use news_harvest::config::{AppConfig, OutputFormat};
use news_harvest::manager::ScraperManager;
use news_harvest::outputs::{csv, json, summary, validation};
use news_harvest::utils::{ensure_writable_dir, timestamp_slug};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // --- Tracing init ---
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_harvest starting up");
    debug!(?args.sites, ?args.limit, ?args.format, "parsed CLI arguments");

    let config = AppConfig::load(args.config.as_deref());
    let manager = ScraperManager::new();

    if args.list_sites {
        let enabled = config.enabled_sites();
        println!("Available sites:");
        for site in manager.available_sites() {
            let status = if enabled.contains(&site) {
                "enabled"
            } else {
                "disabled"
            };
            println!("  - {site} ({status})");
        }
        return Ok(());
    }

    let sites = if args.sites.is_empty() {
        config.enabled_sites()
    } else {
        args.sites.clone()
    };
    if sites.is_empty() {
        error!("no sites requested and none enabled in configuration");
        eprintln!("error: no sites to scrape; pass --sites or enable sites in the configuration");
        std::process::exit(1);
    }

    let limit = args.limit.unwrap_or(config.defaults.limit);
    let format = args.format.unwrap_or(config.defaults.output_format);
    let output_dir = config.defaults.output_dir.clone();

    // Early check: fail before any network work if we cannot write results.
    if let Err(e) = ensure_writable_dir(&output_dir).await {
        error!(
            path = %output_dir.display(),
            error = %e,
            "output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let default_name = |prefix: &str, ext: Option<&str>| -> PathBuf {
        let stem = format!("{prefix}_{}_{}", sites.join("_"), timestamp_slug());
        match ext {
            Some(ext) => output_dir.join(format!("{stem}.{ext}")),
            None => output_dir.join(stem),
        }
    };

    if args.validate {
        info!(?sites, "running adapter validation");
        let results = manager.validate_many(&sites).await;

        let report_path = args
            .output
            .clone()
            .unwrap_or_else(|| default_name("validation", Some("json")));
        validation::write_report(&results, &report_path).await?;
        println!("Validation report written to {}", report_path.display());

        println!("\nValidation complete:");
        for result in &results {
            let status = if result.is_valid { "VALID" } else { "INVALID" };
            println!(
                "  {}: {} ({} ms)",
                result.site, status, result.validation_time_ms
            );
            for issue in &result.issues {
                println!("    issue: {issue}");
            }
            for warning in &result.warnings {
                println!("    warning: {warning}");
            }
        }
        let valid = results.iter().filter(|r| r.is_valid).count();
        println!("  {valid}/{} adapters valid", results.len());
    } else {
        info!(?sites, limit, "running scrape");
        let results = manager.scrape_many(&sites, limit).await;

        match format {
            OutputFormat::Json => {
                let path = args
                    .output
                    .clone()
                    .unwrap_or_else(|| default_name("scraped", Some("json")));
                json::write_results(&results, &path).await?;
                println!("Results written to {}", path.display());
            }
            OutputFormat::Csv => {
                let path = args
                    .output
                    .clone()
                    .unwrap_or_else(|| default_name("scraped", Some("csv")));
                csv::write_results(&results, &path).await?;
                println!("Results written to {}", path.display());
            }
            OutputFormat::Both => {
                let base = args
                    .output
                    .clone()
                    .unwrap_or_else(|| default_name("scraped", None));
                let json_path = base.with_extension("json");
                let csv_path = base.with_extension("csv");
                let summary_path = base.with_extension("txt");

                json::write_results(&results, &json_path).await?;
                csv::write_results(&results, &csv_path).await?;
                summary::write_summary(&results, &summary_path).await?;
                println!(
                    "Results written to {}, {}, {}",
                    json_path.display(),
                    csv_path.display(),
                    summary_path.display()
                );
            }
        }

        let total_articles: usize = results.iter().map(|r| r.success_count).sum();
        let total_errors: usize = results.iter().map(|r| r.error_count).sum();
        println!("\nScraping complete:");
        println!("  articles: {total_articles}");
        println!("  errors: {total_errors}");
        for result in &results {
            println!("  {}: {} articles", result.site, result.success_count);
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "execution complete");

    Ok(())
}
