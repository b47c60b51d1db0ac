//! Bounded concurrent body fetching for one archive day
//!
//! Every listed item becomes one task: fetch the body (with retry), turn it
//! into a record, append it to the sink. At most `workers` tasks are in
//! flight. [`DayWorkerPool::process_day`] returns only after every task has
//! finished, which is the day barrier the controller relies on.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::crawler::progress::{NoopProgress, ProgressReporter};
use crate::crawler::site::SiteAdapter;
use crate::models::{ArticleRecord, DayReport, NewsItem};
use crate::storage::TsvSink;
use crate::utils::retry::RetryPolicy;

/// Fans a day's items out over a bounded number of concurrent fetches
pub struct DayWorkerPool {
    site: Arc<dyn SiteAdapter>,
    retry: RetryPolicy,
    workers: usize,
    progress: Arc<dyn ProgressReporter>,
}

impl DayWorkerPool {
    /// A worker count of 0 is treated as 1
    pub fn new(site: Arc<dyn SiteAdapter>, retry: RetryPolicy, workers: usize) -> Self {
        Self {
            site,
            retry,
            workers: workers.max(1),
            progress: Arc::new(NoopProgress),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fetch and persist every item of `date`
    ///
    /// Failures stay with their item: a body that cannot be fetched or is
    /// empty produces no row and never cancels the other tasks.
    pub async fn process_day(
        &self,
        date: NaiveDate,
        items: &[NewsItem],
        sink: &TsvSink,
    ) -> DayReport {
        let total = items.len();
        self.progress.day_started(date, total);

        let mut done = 0;
        let mut saved = 0;

        let mut tasks = stream::iter(items)
            .map(|item| self.process_item(item, sink))
            .buffer_unordered(self.workers);

        while let Some(written) = tasks.next().await {
            done += 1;
            if written {
                saved += 1;
            }
            self.progress.item_finished(done, total, saved);
        }

        self.progress.day_finished(saved, total);

        DayReport {
            listed: total,
            saved,
        }
    }

    /// Returns `true` when the item became a row
    async fn process_item(&self, item: &NewsItem, sink: &TsvSink) -> bool {
        let body = match self.retry.execute(|| self.site.fetch_body(&item.url)).await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %item.url, error = %e, "Failed to fetch article body");
                return false;
            }
        };

        let Some(record) = ArticleRecord::from_item(item, body) else {
            debug!(url = %item.url, "Article has no body, skipping");
            return false;
        };

        match sink.append(&record) {
            Ok(()) => {
                debug!(url = %item.url, section = %record.section, "Saved article");
                true
            }
            Err(e) => {
                error!(url = %item.url, error = %e, "Failed to write article");
                false
            }
        }
    }
}
