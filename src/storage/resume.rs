//! Resume point derivation from an existing output file
//!
//! The output is written newest-first within a run, so the first data row
//! of a previous run holds the newest date crawled. A new run restarts one
//! day before it and appends to the file.
//!
//! Everything here is a soft failure: an unreadable file never aborts the
//! run, it only loses the resume point.

use chrono::NaiveDate;
use std::path::Path;

use crate::models::OpenMode;
use crate::utils::parse_date_lenient;

/// Where a run starts and how it opens the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    /// `None` when the caller's date (or today) should be used
    pub start_date: Option<NaiveDate>,
    pub mode: OpenMode,
}

impl ResumePoint {
    /// Fresh run: no derived start, truncate and write the header
    pub fn fresh() -> Self {
        Self {
            start_date: None,
            mode: OpenMode::Create,
        }
    }
}

/// Day before the date in the file's first data row
///
/// Returns `None` when the file is missing, has no data rows or its first
/// row carries no parseable date.
pub fn derive_start_date(path: &Path) -> Option<NaiveDate> {
    resume_point(path).start_date
}

/// Inspect `path` and decide the start date and open mode
///
/// | file state                             | start        | mode   |
/// |----------------------------------------|--------------|--------|
/// | missing, empty or header only          | `None`       | create |
/// | first row date parses as `D`           | `D - 1 day`  | append |
/// | first row present, date unparseable    | `None`       | append |
/// | first line neither header nor dated row | `None`       | append |
///
/// A file without a header whose first line is a dated row resumes like
/// any other. Only an empty file or a lone header is ever truncated.
pub fn resume_point(path: &Path) -> ResumePoint {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No existing output, starting fresh");
        return ResumePoint::fresh();
    }

    let keep_content = ResumePoint {
        start_date: None,
        mode: OpenMode::Append,
    };

    let first = match inspect_output(path) {
        Ok(ExistingOutput::NoRows) => {
            tracing::info!(path = %path.display(), "Existing output has no data rows, starting fresh");
            return ResumePoint::fresh();
        }
        Ok(ExistingOutput::FirstRow(field)) => field,
        Ok(ExistingOutput::Unrecognized(line)) => {
            tracing::warn!(
                path = %path.display(),
                first_field = %line,
                "Existing output has no recognizable header or dated row, keeping its content"
            );
            return keep_content;
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read existing output, keeping its content");
            return keep_content;
        }
    };

    match parse_date_lenient(&first).and_then(|date| date.pred_opt()) {
        Some(start) => {
            tracing::info!(
                path = %path.display(),
                newest = %first.trim(),
                resume_from = %start,
                "Resuming from existing output"
            );
            ResumePoint {
                start_date: Some(start),
                mode: OpenMode::Append,
            }
        }
        None => {
            tracing::warn!(
                path = %path.display(),
                value = %first,
                "First row has no usable date, keeping existing content"
            );
            keep_content
        }
    }
}

/// What the start of an existing output file holds
#[derive(Debug, PartialEq, Eq)]
enum ExistingOutput {
    /// Empty, or a header with nothing after it
    NoRows,
    /// Date field of the first data row
    FirstRow(String),
    /// First field of a line that is neither a header nor a dated row
    Unrecognized(String),
}

/// Read the first meaningful lines of `path`
///
/// A first line naming a `date` (or legacy `fecha`) column is a header and
/// fixes the date column. A first line whose leading field is a date is a
/// data row of a headerless file. Blank lines are skipped.
fn inspect_output(path: &Path) -> csv::Result<ExistingOutput> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = reader
        .records()
        .filter(|record| {
            record
                .as_ref()
                .map_or(true, |r| r.iter().any(|field| !field.trim().is_empty()))
        });

    let Some(first) = records.next().transpose()? else {
        return Ok(ExistingOutput::NoRows);
    };

    let leading = first.get(0).unwrap_or_default();
    if parse_date_lenient(leading).is_some() {
        return Ok(ExistingOutput::FirstRow(leading.to_string()));
    }

    let Some(column) = date_column(&first) else {
        return Ok(ExistingOutput::Unrecognized(leading.to_string()));
    };

    match records.next().transpose()? {
        Some(row) => Ok(ExistingOutput::FirstRow(
            row.get(column).unwrap_or_default().to_string(),
        )),
        None => Ok(ExistingOutput::NoRows),
    }
}

fn date_column(header: &csv::StringRecord) -> Option<usize> {
    header.iter().position(|h| {
        let h = h.trim().trim_start_matches('\u{feff}');
        h.eq_ignore_ascii_case("date") || h.eq_ignore_ascii_case("fecha")
    })
}
