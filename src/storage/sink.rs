//! Append-only TSV output shared by concurrent workers
//!
//! Every [`TsvSink::append`] serializes its row in memory, then takes the
//! sink's lock, opens the file in append mode, writes the row with a single
//! `write_all` and closes the file again. Rows from concurrent workers
//! never interleave, and a killed process loses at most the row being
//! written.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::{ArticleRecord, OpenMode, OUTPUT_COLUMNS};

/// Durable tab-delimited record store
#[derive(Debug)]
pub struct TsvSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TsvSink {
    /// Open the output for a run, writing the header in create mode
    ///
    /// # Errors
    ///
    /// Fails when the file (or its parent directory) cannot be created or
    /// opened for writing.
    pub fn open(path: impl Into<PathBuf>, mode: OpenMode) -> Result<Self> {
        let sink = Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        };
        sink.ensure_header(mode)?;
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Prepare the file for `mode`
    ///
    /// `Create` truncates the file and writes the column header.
    /// `Append` never writes a header. It only terminates a last line left
    /// without a newline so the next row starts on a line of its own.
    pub fn ensure_header(&self, mode: OpenMode) -> Result<()> {
        let _guard = self.lock()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        match mode {
            OpenMode::Create => {
                let mut file = File::create(&self.path)?;
                file.write_all(&encode_row(&OUTPUT_COLUMNS)?)?;
                tracing::debug!(path = %self.path.display(), "Wrote output header");
            }
            OpenMode::Append => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .read(true)
                    .append(true)
                    .open(&self.path)?;
                if ends_mid_row(&mut file)? {
                    file.write_all(b"\n")?;
                    tracing::warn!(path = %self.path.display(), "Existing output ends mid-row, starting a new line");
                }
            }
        }

        Ok(())
    }

    /// Append one record as a single row
    pub fn append(&self, record: &ArticleRecord) -> Result<()> {
        let row = encode_row(&record.to_row())?;

        let _guard = self.lock()?;
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(&row)?;
        file.flush()?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| Error::other("output write lock poisoned"))
    }
}

/// Whether a non-empty file lacks a trailing newline
fn ends_mid_row(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Serialize one row with the output dialect (tab delimiter, minimal quoting)
fn encode_row<I, T>(fields: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(fields)?;

    writer
        .into_inner()
        .map_err(|e| Error::other(format!("Failed to encode row: {}", e.error())))
}
