//! Archive page and article body extraction
//!
//! Pure functions over HTML strings. Missing structure is never an error:
//! an archive page without entries yields no items and an article without a
//! body container yields an empty string.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::{NewsItem, SiteKind};
use crate::parser::sanitize::clean_text;
use crate::parser::selectors::SiteSelectors;
use crate::utils::parse_date_lenient;

/// Entries found on one archive page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchivePage {
    pub items: Vec<NewsItem>,
    /// The page links to a following page of the same day
    pub has_next: bool,
}

/// HTML extractor for one site
pub struct ArchiveParser {
    kind: SiteKind,
    selectors: SiteSelectors,
    base_url: Url,
}

impl ArchiveParser {
    /// Create a parser resolving relative links against `base_url`
    ///
    /// # Errors
    ///
    /// Returns the URL parse error when `base_url` is not absolute
    pub fn new(kind: SiteKind, base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            kind,
            selectors: SiteSelectors::for_site(kind),
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn kind(&self) -> SiteKind {
        self.kind
    }

    /// Extract the listed entries of an archive page
    ///
    /// Entries without a title or link are skipped silently.
    pub fn parse_archive_page(&self, html: &str, date: NaiveDate) -> ArchivePage {
        let document = Html::parse_document(html);

        let items = document
            .select(self.selectors.item)
            .filter_map(|entry| self.parse_entry(entry, date))
            .collect::<Vec<_>>();

        let has_next = self
            .selectors
            .next_page
            .map(|next| document.select(next).next().is_some())
            .unwrap_or(false);

        tracing::trace!(site = %self.kind, %date, items = items.len(), has_next, "Parsed archive page");

        ArchivePage { items, has_next }
    }

    fn parse_entry(&self, entry: ElementRef<'_>, date: NaiveDate) -> Option<NewsItem> {
        let title = entry
            .select(self.selectors.title)
            .next()
            .map(|el| clean_text(&el.text().collect::<String>()))?;

        let href = entry
            .select(self.selectors.link)
            .find_map(|el| el.value().attr("href"))?;
        let url = self.resolve(href)?;

        let section = entry
            .select(self.selectors.section)
            .next()
            .map(|el| clean_text(&el.text().collect::<String>()))
            .unwrap_or_default();

        let date = self
            .selectors
            .date
            .and_then(|selector| entry.select(selector).next())
            .and_then(|el| parse_date_lenient(&el.text().collect::<String>()))
            .unwrap_or(date);

        let item = NewsItem::new(date, section, title, url);
        item.is_valid().then_some(item)
    }

    fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        self.base_url.join(href).ok().map(|u| u.to_string())
    }

    /// Extract the cleaned article body, or an empty string when absent
    pub fn parse_body(&self, html: &str) -> String {
        let document = Html::parse_document(html);

        match document.select(self.selectors.body).next() {
            Some(body) => clean_text(&text_without_noise(body, self.selectors.body_noise)),
            None => String::new(),
        }
    }
}

/// Collect the text of `root`, skipping anything nested in a noise element
fn text_without_noise(root: ElementRef<'_>, noise: &[Selector]) -> String {
    let mut text = String::new();

    for node in root.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };

        let in_noise = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != root.id())
            .filter_map(ElementRef::wrap)
            .any(|el| noise.iter().any(|selector| selector.matches(&el)));

        if !in_noise {
            text.push_str(fragment);
        }
    }

    text
}
