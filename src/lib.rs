//! retrocrawl - Historical news archive crawler
//!
//! Walks a news site's daily archive backward in time, saving every
//! article's title, section and body to a tab-delimited file, until a run
//! of consecutive empty days signals the start of the archive. Interrupted
//! runs resume from the newest date already saved.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and per-site settings
//! - [`crawler`] - Site adapters, worker pool and crawl controller
//! - [`parser`] - HTML parsing and text cleaning
//! - [`models`] - Core data structures and types
//! - [`storage`] - TSV output, resume point and file statistics
//! - [`utils`] - Retry policy, fetch errors and date helpers
//!
//! # Example
//!
//! ```no_run
//! use retrocrawl::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let site = NewsSite::new(config.site_config(SiteKind::Peru21))?;
//!     let controller = HistoricalCrawlController::new(
//!         Arc::new(site),
//!         config.retry_policy(),
//!         config.site_config(SiteKind::Peru21).workers,
//!     );
//!
//!     let (_shutdown, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let request = CrawlRequest {
//!         start_date: None,
//!         output_path: config.output_path(SiteKind::Peru21),
//!         max_empty_days: config.crawler.max_empty_days,
//!         resume: true,
//!     };
//!     let summary = controller.run(&request, shutdown_rx).await?;
//!     println!("saved {} articles", summary.total_saved);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, SiteConfig};
    pub use crate::crawler::{
        CrawlRequest, DayWorkerPool, HistoricalCrawlController, NewsSite, ProgressReporter,
        SiteAdapter,
    };
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{
        ArticleRecord, CrawlOutcome, CrawlSummary, DayReport, NewsItem, OpenMode, SiteKind,
    };
    pub use crate::storage::TsvSink;
    pub use crate::utils::retry::RetryPolicy;
}

// Direct re-exports for convenience
pub use models::{ArticleRecord, CrawlSummary, NewsItem, SiteKind};
