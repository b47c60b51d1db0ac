//! HTTP fetcher for archive and article pages
//!
//! This module provides a thin HTTP layer shared by every site adapter:
//! - One `reqwest` client per adapter (read-shared across workers)
//! - Per-request timeout
//! - Status classification into [`FetchError`]
//! - Charset detection and conversion to UTF-8
//!
//! Retrying is not done here; callers wrap requests in a
//! [`RetryPolicy`](crate::utils::retry::RetryPolicy).

use crate::config::SiteConfig;
use crate::utils::error::FetchError;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT},
    Client, Response,
};
use std::time::Duration;

/// Page fetcher bound to one site's settings
#[derive(Debug, Clone)]
pub struct PageFetcher {
    /// HTTP client with configured timeout, headers and compression
    client: Client,
}

impl PageFetcher {
    /// Create a fetcher from site settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &SiteConfig) -> Result<Self, FetchError> {
        Self::with_timeout(&config.user_agent, config.request_timeout)
    }

    /// Create a fetcher with an explicit user agent and timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_timeout(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(Self::build_headers(user_agent))
            .gzip(true)
            .cookie_store(true)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch a page and return its body decoded as UTF-8
    ///
    /// # Errors
    ///
    /// - `FetchError::Timeout` when the request exceeds the timeout
    /// - `FetchError::Status` for any non-success status
    /// - `FetchError::Http` for other transport failures
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url = %url, "Fetching URL");

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(FetchError::Timeout(url.to_string())),
            Err(e) if e.is_builder() => return Err(FetchError::InvalidUrl(url.to_string())),
            Err(e) => return Err(FetchError::Http(e)),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        self.decode_response(response).await
    }

    async fn decode_response(&self, response: Response) -> Result<String, FetchError> {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) if e.is_timeout() => return Err(FetchError::Timeout(String::new())),
            Err(e) => return Err(FetchError::Http(e)),
        };

        decode_bytes(&bytes, &content_type)
    }

    /// Build default request headers
    fn build_headers(user_agent: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, value);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("es-PE,es;q=0.9,en;q=0.5"),
        );

        headers
    }
}

/// Decode bytes to a UTF-8 string with charset detection
///
/// 1. Use the charset named in the Content-Type header when it is known
/// 2. Otherwise try UTF-8
/// 3. Fall back to Windows-1252, the usual legacy encoding of Spanish pages
///
/// Stray invalid bytes are replaced with U+FFFD and the page is kept.
///
/// # Errors
///
/// Returns `FetchError::Decode` when most of the content is undecodable,
/// which means the payload is not text in the declared charset.
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> Result<String, FetchError> {
    let (text, encoding, had_errors) = match charset_from_content_type(content_type) {
        Some(encoding) => encoding.decode(bytes),
        None => match UTF_8.decode(bytes) {
            (_, _, true) => WINDOWS_1252.decode(bytes),
            decoded => decoded,
        },
    };

    if had_errors {
        let replaced = text
            .chars()
            .filter(|c| *c == char::REPLACEMENT_CHARACTER)
            .count();
        if replaced * 2 > text.chars().count() {
            return Err(FetchError::Decode(format!(
                "content is mostly undecodable as {}",
                encoding.name()
            )));
        }
        tracing::warn!(
            encoding = encoding.name(),
            replaced,
            "Replaced undecodable bytes in page"
        );
    }

    Ok(text.into_owned())
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, label)| Encoding::for_label(label.trim().trim_matches('"').as_bytes()))
}
