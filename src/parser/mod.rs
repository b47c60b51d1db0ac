//! HTML parsing and text extraction
//!
//! This module turns archive pages and article pages into [`NewsItem`]s and
//! cleaned body text.
//!
//! [`NewsItem`]: crate::models::NewsItem

pub mod archive;
pub mod sanitize;
pub mod selectors;

pub use archive::{ArchivePage, ArchiveParser};
pub use sanitize::clean_text;
pub use selectors::SiteSelectors;
