//! Progress display for the day worker pool
//!
//! The crawl core reports `done/total` after every finished article and
//! never decides how that is shown. The binary picks an implementation
//! based on `--progress`, `--verbose` and whether stderr is a terminal.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Receives per-day progress from the worker pool
pub trait ProgressReporter: Send + Sync {
    /// A day with `total` items is about to be processed
    fn day_started(&self, _date: chrono::NaiveDate, _total: usize) {}

    /// `done` of `total` items have finished, `saved` of them produced rows
    fn item_finished(&self, done: usize, total: usize, saved: usize);

    /// The pool barrier for the day has been reached
    fn day_finished(&self, _saved: usize, _total: usize) {}
}

/// Shows nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn item_finished(&self, _done: usize, _total: usize, _saved: usize) {}
}

/// One line per update, suitable for logs and pipes
pub struct LineProgress<W: Write + Send> {
    out: Mutex<W>,
}

impl LineProgress<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> LineProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> ProgressReporter for LineProgress<W> {
    fn day_started(&self, date: chrono::NaiveDate, total: usize) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{date}: {total} items");
        }
    }

    fn item_finished(&self, done: usize, total: usize, saved: usize) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "  {done}/{total} processed, {saved} saved");
        }
    }
}

/// One progress bar per day, redrawn in place
///
/// Log lines written through [`RedrawProgress::log_writer`] suspend the bar
/// while they print, so the two never share a terminal line.
pub struct RedrawProgress {
    target: fn() -> ProgressDrawTarget,
    bar: Mutex<Option<ProgressBar>>,
}

impl RedrawProgress {
    pub fn stderr() -> Self {
        Self::with_target(ProgressDrawTarget::stderr)
    }

    /// Tracks progress without drawing anything
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden)
    }

    fn with_target(target: fn() -> ProgressDrawTarget) -> Self {
        Self {
            target,
            bar: Mutex::new(None),
        }
    }

    /// Bar of the current (or last) day
    pub fn current(&self) -> Option<ProgressBar> {
        self.bar.lock().ok().and_then(|bar| bar.clone())
    }

    /// Run `f` with the bar cleared from the terminal
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        match self.current() {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }

    /// Stderr writer for the log subscriber that keeps the bar intact
    pub fn log_writer(self: &Arc<Self>) -> ProgressLogWriter {
        ProgressLogWriter {
            progress: Arc::clone(self),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{prefix} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    }
}

impl ProgressReporter for RedrawProgress {
    fn day_started(&self, date: chrono::NaiveDate, total: usize) {
        let bar = ProgressBar::with_draw_target(Some(total as u64), (self.target)())
            .with_style(Self::style())
            .with_prefix(date.to_string());
        if let Ok(mut current) = self.bar.lock() {
            *current = Some(bar);
        }
    }

    fn item_finished(&self, done: usize, _total: usize, saved: usize) {
        if let Some(bar) = self.current() {
            bar.set_position(done as u64);
            bar.set_message(format!("{saved} saved"));
        }
    }

    fn day_finished(&self, saved: usize, _total: usize) {
        if let Some(bar) = self.current() {
            bar.finish_with_message(format!("{saved} saved"));
        }
    }
}

/// `io::Write` to stderr that suspends the active progress bar
pub struct ProgressLogWriter {
    progress: Arc<RedrawProgress>,
}

impl Write for ProgressLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.progress.suspend(|| io::stderr().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.progress.suspend(|| io::stderr().write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
