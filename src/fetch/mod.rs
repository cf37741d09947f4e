//! Resource retrieval
//!
//! A [`Fetcher`] performs exactly one retrieval attempt for an absolute URL
//! and never raises: every failure is folded into the returned
//! [`FetchOutcome`]. The pipeline leaves the original reference in place
//! when an outcome carries an error, so there is no retry layer here.

pub mod cache;
pub mod http;

use std::future::Future;
use std::pin::Pin;

pub use cache::CachingFetcher;
pub use http::HttpFetcher;

/// Type alias for a boxed fetch future
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = FetchOutcome> + Send + 'a>>;

/// Error type for fetch failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error {status}: {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Resource too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: usize },

    #[error("HTTP client unavailable: {0}")]
    ClientUnavailable(String),
}

/// Bytes and transport metadata of a successful retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub bytes: Vec<u8>,
    /// `Content-Type` header as sent by the server, empty when absent
    pub content_type: String,
}

/// Result of a single retrieval attempt
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The absolute URL that was queried
    pub url: String,
    pub result: Result<FetchedResource, FetchError>,
    /// True when served from a resolution cache (no network request was made)
    pub from_cache: bool,
}

impl FetchOutcome {
    #[must_use]
    pub fn success(url: impl Into<String>, bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            result: Ok(FetchedResource {
                bytes,
                content_type: content_type.into(),
            }),
            from_cache: false,
        }
    }

    #[must_use]
    pub fn failure(url: impl Into<String>, error: FetchError) -> Self {
        Self {
            url: url.into(),
            result: Err(error),
            from_cache: false,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Single-attempt retrieval of an absolute URL
///
/// Implementations must not panic or return early errors: anything that goes
/// wrong is reported through [`FetchOutcome::result`].
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        (**self).fetch(url)
    }
}

impl<F: Fetcher + ?Sized> Fetcher for std::sync::Arc<F> {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        (**self).fetch(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_populates_exactly_one_side() {
        let ok = FetchOutcome::success("https://ex.com/a.png", vec![1, 2, 3], "image/png");
        assert!(ok.is_success());
        assert!(!ok.from_cache);

        let err = FetchOutcome::failure(
            "https://ex.com/b.png",
            FetchError::HttpStatus {
                url: "https://ex.com/b.png".to_string(),
                status: 404,
            },
        );
        assert!(!err.is_success());
        assert_eq!(
            err.result.unwrap_err().to_string(),
            "HTTP error 404: https://ex.com/b.png"
        );
    }
}
