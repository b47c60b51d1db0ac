//! Configuration management for the retrocrawl crawler
//!
//! This module handles loading and validating configuration from environment
//! variables, TOML files, and command-line overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::SiteKind;
use crate::utils::retry::RetryPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Crawler configuration
    pub crawler: CrawlerConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Concurrent body fetches per day; `None` uses the site default
    pub workers: Option<usize>,

    /// Attempts per network request
    pub max_retries: u32,

    /// Base backoff delay in seconds
    pub retry_delay_secs: u64,

    /// Consecutive empty days before the crawl stops
    pub max_empty_days: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,
}

/// Output file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output path; `None` uses the site default file name
    pub path: Option<PathBuf>,

    /// Continue from the newest date already in the output file
    pub resume: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

/// Immutable per-site settings injected into the site adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub kind: SiteKind,
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub workers: usize,
}

impl SiteConfig {
    /// Production settings for `kind`
    pub fn for_site(kind: SiteKind) -> Self {
        Self {
            kind,
            base_url: kind.base_url().to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(10),
            workers: kind.default_workers(),
        }
    }

    /// Point the adapter at another host (mock servers in tests)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let resume = match std::env::var("RETROCRAWL_RESUME") {
            Ok(v) => !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"),
            Err(_) => defaults.output.resume,
        };

        Ok(Self {
            crawler: CrawlerConfig {
                workers: env_parse("RETROCRAWL_WORKERS").or(defaults.crawler.workers),
                max_retries: env_parse("RETROCRAWL_MAX_RETRIES")
                    .unwrap_or(defaults.crawler.max_retries),
                retry_delay_secs: env_parse("RETROCRAWL_RETRY_DELAY")
                    .unwrap_or(defaults.crawler.retry_delay_secs),
                max_empty_days: env_parse("RETROCRAWL_MAX_EMPTY_DAYS")
                    .unwrap_or(defaults.crawler.max_empty_days),
                request_timeout_secs: env_parse("RETROCRAWL_REQUEST_TIMEOUT")
                    .unwrap_or(defaults.crawler.request_timeout_secs),
                user_agent: std::env::var("RETROCRAWL_USER_AGENT")
                    .unwrap_or(defaults.crawler.user_agent),
            },
            output: OutputConfig {
                path: std::env::var("RETROCRAWL_OUTPUT").ok().map(PathBuf::from),
                resume,
            },
            logging: LoggingConfig {
                level: std::env::var("RETROCRAWL_LOG_LEVEL").unwrap_or(defaults.logging.level),
                format: std::env::var("RETROCRAWL_LOG_FORMAT")
                    .unwrap_or(defaults.logging.format),
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.crawler.workers == Some(0) {
            anyhow::bail!("workers must be greater than 0");
        }

        if self.crawler.max_retries == 0 {
            anyhow::bail!("max_retries must be greater than 0");
        }

        if self.crawler.max_empty_days == 0 {
            anyhow::bail!("max_empty_days must be greater than 0");
        }

        if self.crawler.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.request_timeout_secs)
    }

    /// Retry policy shared by list and body fetches
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.crawler.max_retries,
            Duration::from_secs(self.crawler.retry_delay_secs),
        )
    }

    /// Build the adapter settings for `kind`
    #[must_use]
    pub fn site_config(&self, kind: SiteKind) -> SiteConfig {
        SiteConfig {
            user_agent: self.crawler.user_agent.clone(),
            request_timeout: self.request_timeout(),
            workers: self.crawler.workers.unwrap_or_else(|| kind.default_workers()),
            ..SiteConfig::for_site(kind)
        }
    }

    /// Output path for `kind`, falling back to the site's default file name
    #[must_use]
    pub fn output_path(&self, kind: SiteKind) -> PathBuf {
        self.output
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(kind.default_output()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig {
                workers: None,
                max_retries: 3,
                retry_delay_secs: 5,
                max_empty_days: 10,
                request_timeout_secs: 10,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            output: OutputConfig {
                path: None,
                resume: true,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}
