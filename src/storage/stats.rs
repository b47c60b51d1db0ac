//! Summary statistics over an output file

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utils::parse_date_lenient;

/// What an output file holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputStats {
    pub path: PathBuf,
    /// Well-formed data rows
    pub rows: u64,
    /// Rows with the wrong field count or an unparseable date
    pub malformed: u64,
    pub newest: Option<NaiveDate>,
    pub oldest: Option<NaiveDate>,
    /// Rows per section, sorted by name
    pub sections: BTreeMap<String, u64>,
}

impl OutputStats {
    /// Number of distinct calendar days covered
    pub fn span_days(&self) -> Option<i64> {
        match (self.newest, self.oldest) {
            (Some(newest), Some(oldest)) => Some((newest - oldest).num_days().abs() + 1),
            _ => None,
        }
    }
}

/// Read `path` and count its rows
///
/// # Errors
///
/// Fails only when the file cannot be opened; bad rows are counted as
/// malformed.
pub fn summarize(path: &Path) -> Result<OutputStats> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut stats = OutputStats {
        path: path.to_path_buf(),
        ..OutputStats::default()
    };

    for record in reader.records() {
        let Ok(record) = record else {
            stats.malformed += 1;
            continue;
        };

        let date = record.get(0).and_then(parse_date_lenient);
        let (Some(date), 5) = (date, record.len()) else {
            stats.malformed += 1;
            continue;
        };

        stats.rows += 1;
        stats.newest = Some(stats.newest.map_or(date, |d| d.max(date)));
        stats.oldest = Some(stats.oldest.map_or(date, |d| d.min(date)));
        *stats
            .sections
            .entry(record.get(3).unwrap_or_default().to_string())
            .or_default() += 1;
    }

    Ok(stats)
}
