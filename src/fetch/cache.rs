//! Per-conversion resolution cache
//!
//! Wraps another [`Fetcher`] and remembers every outcome (successes and
//! failures) by absolute URL, so a resource referenced several
//! times in one document is only requested once. A cache lives exactly as
//! long as the conversion that created it.

use dashmap::DashMap;

use super::{FetchFuture, FetchOutcome, Fetcher};

/// Cache key for a resolved URL
///
/// Only the fragment is dropped, it never reaches the server. Paths, ports
/// and query strings are kept, so `/img` and `/img/` stay distinct.
fn cache_key(url: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(url) else {
        return url.to_string();
    };
    parsed.set_fragment(None);
    parsed.to_string()
}

/// Fetcher decorator memoizing outcomes by URL
pub struct CachingFetcher<F> {
    inner: F,
    entries: DashMap<String, FetchOutcome>,
}

impl<F: Fetcher> CachingFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
        }
    }

    /// Number of distinct URLs resolved so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: Fetcher> Fetcher for CachingFetcher<F> {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            let key = cache_key(url);

            // Clone out of the map so no shard lock is held across the await below
            let cached = self.entries.get(&key).map(|entry| entry.value().clone());
            if let Some(mut hit) = cached {
                log::debug!("[CACHE-HIT] {url}");
                hit.url = url.to_string();
                hit.from_cache = true;
                return hit;
            }

            // Two concurrent misses on the same key both go to the network; the
            // second insert simply overwrites the first with an equivalent outcome.
            let outcome = self.inner.fetch(url).await;
            self.entries.insert(key, outcome.clone());
            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    impl Fetcher for CountingFetcher {
        fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if url.contains("missing") {
                    FetchOutcome::failure(
                        url,
                        FetchError::HttpStatus {
                            url: url.to_string(),
                            status: 404,
                        },
                    )
                } else {
                    FetchOutcome::success(url, b"body".to_vec(), "text/plain")
                }
            })
        }
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("http://example.com/img.png#top"), "http://example.com/img.png");
        assert_eq!(cache_key("https://example.com/a/"), "https://example.com/a/");
        assert_eq!(cache_key("https://example.com/a?v"), "https://example.com/a?v");
        assert_eq!(cache_key("https://example.com:8443/a"), "https://example.com:8443/a");
        assert_eq!(cache_key("not a url"), "not a url");
    }

    #[tokio::test]
    async fn trailing_slash_is_a_different_resource() {
        let cache = CachingFetcher::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });

        let dir = cache.fetch("https://ex.com/img/").await;
        let file = cache.fetch("https://ex.com/img").await;

        assert!(!dir.from_cache);
        assert!(!file.from_cache);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.into_inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn repeated_urls_hit_the_network_once() {
        let cache = CachingFetcher::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });

        let first = cache.fetch("https://ex.com/a.png").await;
        let second = cache.fetch("https://ex.com/a.png#hero").await;

        assert!(first.is_success() && !first.from_cache);
        assert!(second.is_success() && second.from_cache);
        assert_eq!(second.url, "https://ex.com/a.png#hero");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.into_inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_cached_too() {
        let cache = CachingFetcher::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });

        let first = cache.fetch("https://ex.com/missing.png").await;
        let second = cache.fetch("https://ex.com/missing.png").await;

        assert!(!first.is_success());
        assert!(!second.is_success() && second.from_cache);
        assert_eq!(cache.into_inner().calls.load(Ordering::SeqCst), 1);
    }
}
