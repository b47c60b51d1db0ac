pub mod crawl;

// Re-export command functions for convenience
pub use crawl::{crawl, day, stats};
