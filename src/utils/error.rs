//! Error types for archive fetching
//!
//! Every failure that can happen while talking to a news site is expressed
//! as a [`FetchError`]. The [`Retryable`] classification decides whether a
//! [`RetryPolicy`](crate::utils::retry::RetryPolicy) keeps trying.

use thiserror::Error;

/// Classification used by the retry policy
pub trait Retryable {
    /// Whether another attempt could plausibly succeed
    fn is_retryable(&self) -> bool;
}

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (connection refused, DNS, reset)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Non-success status code
    #[error("Unexpected status {status} for {url}")]
    Status { status: u16, url: String },

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Status code carried by the error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the server answered 404 Not Found
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Determine if a status code should trigger a retry
///
/// Retry on 408, 429 and the 5xx gateway/server family. Everything else in
/// the 4xx range is a definitive answer from the server.
#[must_use]
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => match e.status() {
                Some(status) => is_retryable_status(status.as_u16()),
                None => !e.is_builder(),
            },
            Self::Timeout(_) => true,
            Self::Status { status, .. } => is_retryable_status(*status),
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }
}
