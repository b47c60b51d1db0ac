//! Backward day-by-day crawl with resume and drain detection
//!
//! The controller walks the archive from a start date into the past, one
//! day at a time, and stops once `max_empty_days` consecutive days listed
//! nothing. A day whose listing fails after all retries is neither empty
//! nor processed: the controller pauses and asks for the same day again, so
//! an outage is never mistaken for the end of the archive.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::crawler::pool::DayWorkerPool;
use crate::crawler::progress::ProgressReporter;
use crate::crawler::site::SiteAdapter;
use crate::error::Result;
use crate::models::{CrawlCursor, CrawlOutcome, CrawlSummary, DayReport, OpenMode};
use crate::storage::{resume_point, TsvSink};
use crate::utils::error::Retryable;
use crate::utils::retry::RetryPolicy;

/// Parameters of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// Start when no resume point applies; `None` means today
    pub start_date: Option<NaiveDate>,
    pub output_path: PathBuf,
    pub max_empty_days: u32,
    /// Continue from the newest date already in `output_path`
    pub resume: bool,
}

/// Drives the crawl loop for one site
pub struct HistoricalCrawlController {
    site: Arc<dyn SiteAdapter>,
    retry: RetryPolicy,
    pool: DayWorkerPool,
}

impl HistoricalCrawlController {
    pub fn new(site: Arc<dyn SiteAdapter>, retry: RetryPolicy, workers: usize) -> Self {
        let pool = DayWorkerPool::new(Arc::clone(&site), retry.clone(), workers);
        Self { site, retry, pool }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.pool = self.pool.with_progress(progress);
        self
    }

    /// Crawl backward until drained or cancelled
    ///
    /// Cancellation is observed between days: the day in progress runs to
    /// its barrier and its rows are kept. A pause after a failed listing is
    /// cut short by cancellation.
    ///
    /// # Errors
    ///
    /// Only a failure to open the output file ends the run with an error.
    /// Listing and article failures are logged and contained.
    pub async fn run(
        &self,
        request: &CrawlRequest,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<CrawlSummary> {
        let (start_date, mode) = self.starting_point(request);

        let sink = TsvSink::open(&request.output_path, mode).inspect_err(|e| {
            tracing::error!(
                path = %request.output_path.display(),
                category = e.category().as_str(),
                error = %e,
                "Cannot open output file"
            );
        })?;

        info!(
            site = self.site.name(),
            start = %start_date,
            output = %request.output_path.display(),
            mode = %mode,
            max_empty_days = request.max_empty_days,
            workers = self.pool.workers(),
            "Starting historical crawl"
        );

        let mut cursor = CrawlCursor::new(start_date);

        let outcome = loop {
            if cursor.is_drained(request.max_empty_days) {
                break CrawlOutcome::Drained;
            }
            if *shutdown.borrow() {
                break CrawlOutcome::Interrupted;
            }

            let date = cursor.current_date;

            match self.retry.execute(|| self.site.list_day(date)).await {
                Err(e) if e.is_retryable() => {
                    warn!(
                        %date,
                        error = %e,
                        pause_secs = self.retry.retry_delay().as_secs(),
                        "Archive listing failed, retrying the same day"
                    );
                    pause(&mut shutdown, self.retry.retry_delay()).await;
                    continue;
                }
                Err(e) => {
                    cursor.record_empty_day();
                    warn!(
                        %date,
                        error = %e,
                        empty_days = cursor.consecutive_empty_days,
                        "Archive listing rejected, counting the day as empty"
                    );
                }
                Ok(items) if items.is_empty() => {
                    cursor.record_empty_day();
                    info!(
                        %date,
                        empty_days = cursor.consecutive_empty_days,
                        max_empty_days = request.max_empty_days,
                        "No news listed"
                    );
                }
                Ok(items) => {
                    let report = self.pool.process_day(date, &items, &sink).await;
                    cursor.record_day(report.saved as u64);
                    info!(
                        %date,
                        listed = report.listed,
                        saved = report.saved,
                        total_saved = cursor.total_saved,
                        "Day processed"
                    );
                }
            }

            if !cursor.advance() {
                warn!(%date, "Reached the earliest representable date");
                break CrawlOutcome::Drained;
            }
        };

        let summary = CrawlSummary::from_cursor(outcome, start_date, mode, &cursor);
        info!(
            outcome = %summary.outcome,
            days_processed = summary.days_processed,
            total_saved = summary.total_saved,
            next_date = %summary.next_date,
            "Crawl finished"
        );

        Ok(summary)
    }

    /// Extract a single day into a fresh output file
    ///
    /// # Errors
    ///
    /// Fails when the output cannot be created or the day cannot be listed.
    pub async fn extract_day(&self, date: NaiveDate, output_path: &Path) -> Result<DayReport> {
        let sink = TsvSink::open(output_path, OpenMode::Create)?;

        let items = self.retry.execute(|| self.site.list_day(date)).await?;
        if items.is_empty() {
            info!(%date, "No news listed");
            return Ok(DayReport::default());
        }

        let report = self.pool.process_day(date, &items, &sink).await;
        info!(%date, listed = report.listed, saved = report.saved, "Day extracted");

        Ok(report)
    }

    fn starting_point(&self, request: &CrawlRequest) -> (NaiveDate, OpenMode) {
        let fallback = || request.start_date.unwrap_or_else(today);

        if !request.resume {
            return (fallback(), OpenMode::Create);
        }

        let point = resume_point(&request.output_path);
        (point.start_date.unwrap_or_else(fallback), point.mode)
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Sleep for `delay` unless a shutdown is signalled first
async fn pause(shutdown: &mut watch::Receiver<bool>, delay: Duration) {
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        Ok(()) = shutdown.changed() => {}
    }
}
