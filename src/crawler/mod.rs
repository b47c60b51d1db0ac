//! Archive crawling
//!
//! This module drives the historical crawl:
//! - [`site`] - the `SiteAdapter` capability and the concrete `NewsSite`
//! - [`fetcher`] - HTTP fetching and charset decoding
//! - [`pool`] - bounded concurrent body fetching for one day
//! - [`controller`] - the backward day loop with resume and drain detection
//! - [`progress`] - pluggable progress display

pub mod controller;
pub mod fetcher;
pub mod pool;
pub mod progress;
pub mod site;

pub use controller::{CrawlRequest, HistoricalCrawlController};
pub use fetcher::PageFetcher;
pub use pool::DayWorkerPool;
pub use progress::{
    LineProgress, NoopProgress, ProgressLogWriter, ProgressReporter, RedrawProgress,
};
pub use site::{NewsSite, SiteAdapter};
