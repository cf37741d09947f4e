//! HTTP fetcher backed by `reqwest`
//!
//! Handles download with streaming, size limits, and timeout. TLS
//! certificates are validated (rustls with the bundled web roots).

use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;

use super::{FetchError, FetchFuture, FetchOutcome, FetchedResource, Fetcher};
use crate::config::StandaloneConfig;

/// Single-attempt HTTP(S) fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_bytes: usize,
}

impl HttpFetcher {
    /// Build a fetcher with an explicit identity, timeout and body limit
    ///
    /// Fails only when the HTTP client itself cannot be constructed (for
    /// example when no TLS backend can be initialized). The caller treats
    /// that as a missing collaborator.
    pub fn new(user_agent: &str, timeout: Duration, max_bytes: usize) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::ClientUnavailable(e.to_string()))?;

        Ok(Self { client, max_bytes })
    }

    /// Build a fetcher from the conversion configuration
    pub fn from_config(config: &StandaloneConfig) -> Result<Self, FetchError> {
        Self::new(
            config.user_agent(),
            config.fetch_timeout(),
            config.max_resource_bytes(),
        )
    }

    async fn fetch_resource(&self, url: &str) -> Result<FetchedResource, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "*/*")
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        // Enforce limit BEFORE downloading
        let expected_size = response.content_length().unwrap_or(0);
        if expected_size > self.max_bytes as u64 {
            return Err(FetchError::TooLarge {
                size: expected_size,
                limit: self.max_bytes,
            });
        }

        let mut buffer = if expected_size > 0 {
            Vec::with_capacity(expected_size as usize)
        } else {
            Vec::new()
        };

        // Content-Length can be absent or wrong, check again while streaming
        let mut stream = response.bytes_stream();
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| FetchError::Request(e.to_string()))?;

            let new_total = buffer.len() + chunk.len();
            if new_total > self.max_bytes {
                return Err(FetchError::TooLarge {
                    size: new_total as u64,
                    limit: self.max_bytes,
                });
            }

            buffer.extend_from_slice(&chunk);
        }

        Ok(FetchedResource {
            bytes: buffer,
            content_type,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            match self.fetch_resource(url).await {
                Ok(resource) => {
                    log::debug!(
                        "Fetched {url} ({} bytes, content-type: {:?})",
                        resource.bytes.len(),
                        resource.content_type
                    );
                    FetchOutcome {
                        url: url.to_string(),
                        result: Ok(resource),
                        from_cache: false,
                    }
                }
                Err(e) => {
                    log::warn!("Failed to fetch {url}: {e}");
                    FetchOutcome::failure(url, e)
                }
            }
        })
    }
}
