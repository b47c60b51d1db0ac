//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application:
//! retry with backoff, fetch error classification and date handling.

pub mod error;
pub mod retry;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date format used in archive URLs and in the output file
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date the way archive URLs and output rows expect it
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a date field leniently
///
/// Accepts `YYYY-MM-DD`, a date followed by a time (`2025-11-01 12:08`),
/// and RFC 3339 timestamps. Only the calendar date is kept.
pub fn parse_date_lenient(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let first = value.split_whitespace().next()?;

    if let Ok(date) = NaiveDate::parse_from_str(first, DATE_FORMAT) {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}
