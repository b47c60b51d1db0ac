//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use retrocrawl::crawler::SiteAdapter;
use retrocrawl::models::NewsItem;
use retrocrawl::utils::error::FetchError;
use retrocrawl::utils::retry::RetryPolicy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

pub const HEADER: &str = "date\ttitle\tbody\tsection\turl";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Retry policy with millisecond delays
pub fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, Duration::from_millis(1))
}

/// `count` items listed for `day`, with URLs unique per day
pub fn items_for(day: NaiveDate, count: usize) -> Vec<NewsItem> {
    (0..count)
        .map(|i| {
            NewsItem::new(
                day,
                "Política",
                format!("Titular {i} del {day}"),
                format!("https://noticias.test/{day}/nota-{i}"),
            )
        })
        .collect()
}

/// How the mock answers a body request
#[derive(Debug, Clone)]
pub enum BodyScript {
    Text(String),
    Empty,
    /// Always fails with a retryable timeout
    Fail,
}

type BodyHook = Box<dyn Fn(&str) + Send + Sync>;

/// Scripted site: per-date listings, failures and bodies
///
/// Dates without a script list nothing. URLs without a script return a
/// non-empty body.
#[derive(Default)]
pub struct MockSite {
    days: HashMap<NaiveDate, Vec<NewsItem>>,
    list_failures: Mutex<HashMap<NaiveDate, u32>>,
    rejected_days: Vec<NaiveDate>,
    bodies: HashMap<String, BodyScript>,
    on_body: Option<BodyHook>,
    queried: Mutex<Vec<NaiveDate>>,
    body_calls: Mutex<HashMap<String, u32>>,
}

impl MockSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, day: NaiveDate, items: Vec<NewsItem>) -> Self {
        self.days.insert(day, items);
        self
    }

    /// The first `times` listings of `day` fail with a timeout
    pub fn with_list_failures(self, day: NaiveDate, times: u32) -> Self {
        self.list_failures.lock().unwrap().insert(day, times);
        self
    }

    /// Listing `day` always fails with HTTP 403
    pub fn with_rejected_day(mut self, day: NaiveDate) -> Self {
        self.rejected_days.push(day);
        self
    }

    pub fn with_body(mut self, url: &str, body: BodyScript) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    /// Run `hook` with the URL at the start of every body fetch
    pub fn on_body_fetch(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_body = Some(Box::new(hook));
        self
    }

    /// Every `list_day` call in order, failures included
    pub fn queried_dates(&self) -> Vec<NaiveDate> {
        self.queried.lock().unwrap().clone()
    }

    pub fn list_calls(&self, day: NaiveDate) -> usize {
        self.queried_dates().iter().filter(|d| **d == day).count()
    }

    pub fn body_calls(&self, url: &str) -> u32 {
        self.body_calls
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl SiteAdapter for MockSite {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_day(&self, date: NaiveDate) -> Result<Vec<NewsItem>, FetchError> {
        self.queried.lock().unwrap().push(date);

        if self.rejected_days.contains(&date) {
            return Err(FetchError::Status {
                status: 403,
                url: format!("mock://{date}"),
            });
        }

        {
            let mut failures = self.list_failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&date) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(FetchError::Timeout(format!("mock://{date}")));
                }
            }
        }

        Ok(self.days.get(&date).cloned().unwrap_or_default())
    }

    async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        *self
            .body_calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;

        if let Some(hook) = &self.on_body {
            hook(url);
        }

        match self.bodies.get(url) {
            Some(BodyScript::Text(text)) => Ok(text.clone()),
            Some(BodyScript::Empty) => Ok(String::new()),
            Some(BodyScript::Fail) => Err(FetchError::Timeout(url.to_string())),
            None => Ok(format!("Cuerpo de la nota {url}")),
        }
    }
}

/// Data rows of an output file (header excluded)
pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .unwrap();

    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

/// Write a header and the given raw lines
pub fn write_output(path: &Path, lines: &[&str]) {
    let mut content = format!("{HEADER}\n");
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    std::fs::write(path, content).unwrap();
}

pub fn header_count(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| *line == HEADER)
        .count()
}
