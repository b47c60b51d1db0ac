//! Site adapters: the crawl core's only view of a news site
//!
//! A [`SiteAdapter`] answers two questions: which items were listed on an
//! archive day, and what is the body text behind an article URL. The
//! controller never sees HTML.
//!
//! [`NewsSite`] is the single concrete adapter; the per-site differences
//! (URL scheme, pagination, selectors) hang off its [`SiteKind`].

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;

use crate::config::SiteConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::models::{NewsItem, SiteKind};
use crate::parser::{ArchivePage, ArchiveParser};
use crate::utils::error::FetchError;
use crate::utils::format_date;

/// Upper bound on archive pages read for one day
const MAX_ARCHIVE_PAGES: u32 = 200;

/// Capability supplied by a site: list a day, fetch a body
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Every valid item listed for `date`
    ///
    /// Either the complete list for the day or an error. A page that fails
    /// midway through pagination fails the whole call.
    async fn list_day(&self, date: NaiveDate) -> Result<Vec<NewsItem>, FetchError>;

    /// Cleaned body text behind `url`
    ///
    /// An empty string means the page had no article body; transport
    /// failures are errors.
    async fn fetch_body(&self, url: &str) -> Result<String, FetchError>;
}

/// Day-indexed archive site
pub struct NewsSite {
    config: SiteConfig,
    fetcher: PageFetcher,
    parser: ArchiveParser,
}

impl NewsSite {
    /// Create an adapter from immutable site settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` for a malformed base URL and
    /// `FetchError::Http` if the HTTP client cannot be built
    pub fn new(config: SiteConfig) -> Result<Self, FetchError> {
        let parser = ArchiveParser::new(config.kind, &config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        let fetcher = PageFetcher::new(&config)?;

        Ok(Self {
            config,
            fetcher,
            parser,
        })
    }

    pub fn kind(&self) -> SiteKind {
        self.config.kind
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Archive URL for `date`; page numbers start at 1
    ///
    /// # Examples
    ///
    /// ```
    /// use retrocrawl::config::SiteConfig;
    /// use retrocrawl::crawler::site::NewsSite;
    /// use retrocrawl::models::SiteKind;
    /// use chrono::NaiveDate;
    ///
    /// let site = NewsSite::new(SiteConfig::for_site(SiteKind::Peru21)).unwrap();
    /// let date = NaiveDate::from_ymd_opt(2025, 11, 2).unwrap();
    /// assert_eq!(site.archive_url(date, 1), "https://peru21.pe/archivo/todas/2025-11-02/");
    /// assert_eq!(site.archive_url(date, 3), "https://peru21.pe/archivo/todas/2025-11-02/3/");
    /// ```
    pub fn archive_url(&self, date: NaiveDate, page: u32) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let day = format_date(date);

        if page <= 1 {
            format!("{base}/archivo/todas/{day}/")
        } else {
            format!("{base}/archivo/todas/{day}/{page}/")
        }
    }

    /// Fetch one archive page; a 404 counts as an empty page
    async fn fetch_archive_page(
        &self,
        date: NaiveDate,
        page: u32,
    ) -> Result<ArchivePage, FetchError> {
        let url = self.archive_url(date, page);

        match self.fetcher.fetch_text(&url).await {
            Ok(html) => Ok(self.parser.parse_archive_page(&html, date)),
            Err(e) if e.is_not_found() => {
                tracing::debug!(url = %url, "Archive page not found");
                Ok(ArchivePage::default())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl SiteAdapter for NewsSite {
    fn name(&self) -> &str {
        self.config.kind.as_str()
    }

    async fn list_day(&self, date: NaiveDate) -> Result<Vec<NewsItem>, FetchError> {
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut page = 1;

        loop {
            let archive = self.fetch_archive_page(date, page).await?;

            if archive.items.is_empty() {
                tracing::debug!(site = %self.kind(), %date, page, "No entries on page, stopping pagination");
                break;
            }

            for item in archive.items {
                if seen.insert(item.url.clone()) {
                    items.push(item);
                }
            }

            if !archive.has_next || page >= MAX_ARCHIVE_PAGES {
                break;
            }

            page += 1;
        }

        tracing::debug!(site = %self.kind(), %date, pages = page, items = items.len(), "Listed archive day");

        Ok(items)
    }

    async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        let html = self.fetcher.fetch_text(url).await?;
        Ok(self.parser.parse_body(&html))
    }
}
