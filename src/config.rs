//! Application configuration.
//!
//! Settings are loaded from a YAML file into an explicit [`AppConfig`]
//! value, constructed once at startup and passed by reference into the
//! orchestration entry points; there is no ambient global configuration.
//! A missing or unreadable file falls back to the built-in defaults with a
//! warning, so the binary stays usable without any configuration at all.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;
use tracing::{info, warn};

use crate::scrapers::{hackernews, reuters_japan, yahoo_news_japan};

/// Config file probed when no `--config` path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/settings.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
    /// JSON + CSV + text summary.
    Both,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Maximum articles per site.
    pub limit: usize,
    pub output_format: OutputFormat,
    pub output_dir: PathBuf,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            limit: 30,
            output_format: OutputFormat::Json,
            output_dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: Defaults,
    pub sites: BTreeMap<String, SiteConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut sites = BTreeMap::new();
        for site in [
            hackernews::SITE_NAME,
            reuters_japan::SITE_NAME,
            yahoo_news_japan::SITE_NAME,
        ] {
            sites.insert(site.to_string(), SiteConfig { enabled: true });
        }
        AppConfig {
            defaults: Defaults::default(),
            sites,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or probe the default location.
    ///
    /// Any failure (missing file, unreadable, invalid YAML) degrades to the
    /// built-in defaults with a warning.
    pub fn load(path: Option<&Path>) -> AppConfig {
        let path = match path {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    return AppConfig::default();
                }
                default
            }
        };

        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_yaml::from_str(&raw) {
                Ok(config) => {
                    info!(path = %path.display(), "configuration loaded");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid configuration; using defaults");
                    AppConfig::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "configuration not readable; using defaults");
                AppConfig::default()
            }
        }
    }

    pub fn enabled_sites(&self) -> Vec<String> {
        self.sites
            .iter()
            .filter(|(_, site)| site.enabled)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_all_builtin_sites() {
        let config = AppConfig::default();
        assert_eq!(config.defaults.limit, 30);
        assert_eq!(config.defaults.output_format, OutputFormat::Json);
        assert_eq!(
            config.enabled_sites(),
            vec!["hackernews", "reuters_japan", "yahoo_news_japan"]
        );
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: AppConfig = serde_yaml::from_str(
            "defaults:\n  limit: 5\nsites:\n  hackernews:\n    enabled: true\n",
        )
        .unwrap();

        assert_eq!(config.defaults.limit, 5);
        assert_eq!(config.defaults.output_format, OutputFormat::Json);
        assert_eq!(config.defaults.output_dir, PathBuf::from("output"));
        assert_eq!(config.enabled_sites(), vec!["hackernews"]);
    }

    #[test]
    fn disabled_sites_are_excluded() {
        let config: AppConfig = serde_yaml::from_str(
            "sites:\n  hackernews:\n    enabled: false\n  yahoo_news_japan:\n    enabled: true\n",
        )
        .unwrap();

        assert_eq!(config.enabled_sites(), vec!["yahoo_news_japan"]);
    }

    #[test]
    fn output_format_parses_lowercase() {
        let config: AppConfig =
            serde_yaml::from_str("defaults:\n  output_format: both\n").unwrap();
        assert_eq!(config.defaults.output_format, OutputFormat::Both);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load(Some(Path::new("/definitely/not/here.yaml")));
        assert_eq!(config.defaults.limit, 30);
    }
}
