// Core data structures for the retrocrawl crawler

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::parser::sanitize::has_content;
use crate::utils::format_date;

/// Section used when an archive entry carries none
pub const DEFAULT_SECTION: &str = "General";

/// Column order of the output file
pub const OUTPUT_COLUMNS: [&str; 5] = ["date", "title", "body", "section", "url"];

/// One article reference listed on an archive day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Archive day the item was listed under (an adapter may override it)
    pub date: NaiveDate,
    pub section: String,
    pub title: String,
    /// Absolute URL, resolved against the site's base URL
    pub url: String,
}

impl NewsItem {
    /// Build an item, falling back to [`DEFAULT_SECTION`] for a blank section
    pub fn new(
        date: NaiveDate,
        section: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let section = section.into();
        Self {
            date,
            section: if section.trim().is_empty() {
                DEFAULT_SECTION.to_string()
            } else {
                section
            },
            title: title.into(),
            url: url.into(),
        }
    }

    /// An item needs both a title and a URL to be worth fetching
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// One persisted output row
///
/// Only constructed through [`ArticleRecord::from_item`], which refuses an
/// empty body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub date: NaiveDate,
    pub title: String,
    pub body: String,
    pub section: String,
    pub url: String,
}

impl ArticleRecord {
    /// Combine a listed item with its fetched body
    ///
    /// Returns `None` when the body is blank: such items never become rows.
    pub fn from_item(item: &NewsItem, body: String) -> Option<Self> {
        if !has_content(&body) {
            return None;
        }

        Some(Self {
            date: item.date,
            title: item.title.clone(),
            body,
            section: item.section.clone(),
            url: item.url.clone(),
        })
    }

    /// Fields in output column order
    pub fn to_row(&self) -> [String; 5] {
        [
            format_date(self.date),
            self.title.clone(),
            self.body.clone(),
            self.section.clone(),
            self.url.clone(),
        ]
    }
}

/// How the output file is opened for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenMode {
    /// Truncate the file and write the header row
    Create,
    /// Keep existing rows, never write a header
    Append,
}

impl std::fmt::Display for OpenMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Append => write!(f, "append"),
        }
    }
}

/// Supported archive sites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteKind {
    DiarioCorreo,
    Peru21,
}

impl SiteKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiarioCorreo => "correo",
            Self::Peru21 => "peru21",
        }
    }

    /// Human-readable site name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DiarioCorreo => "Diario Correo",
            Self::Peru21 => "Peru21",
        }
    }

    /// Production base URL
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::DiarioCorreo => "https://diariocorreo.pe",
            Self::Peru21 => "https://peru21.pe",
        }
    }

    /// Default number of concurrent body fetches
    pub fn default_workers(&self) -> usize {
        match self {
            Self::DiarioCorreo => 10,
            Self::Peru21 => 20,
        }
    }

    /// Default output file name
    pub fn default_output(&self) -> &'static str {
        match self {
            Self::DiarioCorreo => "noticias.tsv",
            Self::Peru21 => "noticias_peru21.tsv",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "correo" | "diariocorreo" | "diario-correo" => Some(Self::DiarioCorreo),
            "peru21" | "peru-21" => Some(Self::Peru21),
            _ => None,
        }
    }

    /// Get all sites
    pub fn all() -> Vec<Self> {
        vec![Self::DiarioCorreo, Self::Peru21]
    }
}

impl std::fmt::Display for SiteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SiteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown site: {s}. Valid: correo, peru21"))
    }
}

/// The controller's moving state during one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlCursor {
    pub current_date: NaiveDate,
    pub consecutive_empty_days: u32,
    pub total_saved: u64,
    pub days_processed: u64,
}

impl CrawlCursor {
    pub fn new(start: NaiveDate) -> Self {
        Self {
            current_date: start,
            consecutive_empty_days: 0,
            total_saved: 0,
            days_processed: 0,
        }
    }

    /// Record a day that listed no items
    pub fn record_empty_day(&mut self) {
        self.consecutive_empty_days += 1;
    }

    /// Record a day that listed items, of which `saved` became rows
    pub fn record_day(&mut self, saved: u64) {
        self.consecutive_empty_days = 0;
        self.total_saved += saved;
    }

    /// Step one calendar day into the past
    ///
    /// Returns `false` when the calendar has no earlier date.
    pub fn advance(&mut self) -> bool {
        self.days_processed += 1;
        match self.current_date.pred_opt() {
            Some(previous) => {
                self.current_date = previous;
                true
            }
            None => false,
        }
    }

    pub fn is_drained(&self, max_empty_days: u32) -> bool {
        self.consecutive_empty_days >= max_empty_days
    }
}

/// Why a crawl run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlOutcome {
    /// Reached the configured number of consecutive empty days
    Drained,
    /// Stopped by an external cancellation
    Interrupted,
}

impl std::fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drained => write!(f, "drained"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Final report of a crawl run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub outcome: CrawlOutcome,
    pub start_date: NaiveDate,
    /// Next date that would have been queried
    pub next_date: NaiveDate,
    pub days_processed: u64,
    pub total_saved: u64,
    pub mode: OpenMode,
}

impl CrawlSummary {
    pub fn from_cursor(
        outcome: CrawlOutcome,
        start_date: NaiveDate,
        mode: OpenMode,
        cursor: &CrawlCursor,
    ) -> Self {
        Self {
            outcome,
            start_date,
            next_date: cursor.current_date,
            days_processed: cursor.days_processed,
            total_saved: cursor.total_saved,
            mode,
        }
    }
}

/// Result of processing one archive day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    /// Items listed for the day
    pub listed: usize,
    /// Rows written
    pub saved: usize,
}

impl DayReport {
    pub fn dropped(&self) -> usize {
        self.listed.saturating_sub(self.saved)
    }
}
