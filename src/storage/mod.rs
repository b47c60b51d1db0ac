//! Output persistence
//!
//! - [`sink`] - concurrent-safe TSV appends
//! - [`resume`] - resume point derived from an existing output file
//! - [`stats`] - summary of what an output file holds

pub mod resume;
pub mod sink;
pub mod stats;

pub use resume::{derive_start_date, resume_point, ResumePoint};
pub use sink::TsvSink;
pub use stats::{summarize, OutputStats};
