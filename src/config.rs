// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "congresscraper.yaml";

/// Run configuration, loaded from a YAML file. Every field has a default,
/// so an empty (or absent) file is a valid configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScrapeConfig {
    /// Where per-hearing `.txt` / `.json` artifacts land.
    pub records_dir: PathBuf,
    /// Where the consolidated Parquet/CSV dataset lands.
    pub dataset_dir: PathBuf,
    /// Where run history lands.
    pub history_dir: PathBuf,

    /// Floor on the crawl delay; the robots value wins when larger.
    pub crawl_delay_floor_secs: f64,
    /// Random extra delay added on top of each crawl-delay wait.
    pub jitter_secs: f64,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,

    /// Fetch the live robots.txt at startup (falling back to the embedded
    /// copy). When false, the embedded copy is used directly.
    pub fetch_live_robots: bool,
    /// Discover hearing URLs from the declared sitemap.
    pub use_sitemap: bool,
    /// Restrict sitemap discovery to one congress.
    pub congress: Option<u16>,
    /// Explicit hearing URLs to scrape in addition to discovery.
    pub seed_urls: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            records_dir: PathBuf::from("hearings"),
            dataset_dir: PathBuf::from("dataset"),
            history_dir: PathBuf::from("history"),
            crawl_delay_floor_secs: 2.0,
            jitter_secs: 1.0,
            request_timeout_secs: 60,
            max_retries: 3,
            initial_backoff_ms: 500,
            fetch_live_robots: true,
            use_sitemap: true,
            congress: None,
            seed_urls: Vec::new(),
        }
    }
}

impl ScrapeConfig {
    /// Load from `path`, or from `congresscraper.yaml` when `path` is
    /// `None`. An explicitly named file must exist; the default path is
    /// optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        if !path.is_file() {
            if required {
                anyhow::bail!("config file not found: {}", path.display());
            }
            info!("no config file; using defaults");
            return Ok(ScrapeConfig::default());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        if text.trim().is_empty() {
            return Ok(ScrapeConfig::default());
        }
        let config: ScrapeConfig =
            serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn crawl_delay_floor(&self) -> Duration {
        Duration::from_secs_f64(self.crawl_delay_floor_secs)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_secs_f64(self.jitter_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_yaml_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "congress: 118\nseed_urls:\n  - https://www.congress.gov/event/118th-congress/house-event/117090/text\ncrawl_delay_floor_secs: 3.5"
        )
        .unwrap();

        let config = ScrapeConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.congress, Some(118));
        assert_eq!(config.seed_urls.len(), 1);
        assert_eq!(config.crawl_delay_floor(), Duration::from_secs_f64(3.5));
        // untouched fields keep their defaults
        assert_eq!(config.records_dir, PathBuf::from("hearings"));
        assert!(config.use_sitemap);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "craw_delay_floor_secs: 3").unwrap();
        assert!(ScrapeConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(ScrapeConfig::load(Some(Path::new("/nonexistent/x.yaml"))).is_err());
    }
}
