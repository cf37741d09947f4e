//! Test utilities shared by the standalone conversion test suite

use kodegen_tools_standalone::fetch::{FetchError, FetchFuture, FetchOutcome, Fetcher};
use kodegen_tools_standalone::renderer::{PageRenderer, RenderFuture, RenderedPage};
use kodegen_tools_standalone::StandaloneError;
use mockito::{Mock, Server};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Smallest valid PNG (1x1 transparent pixel)
#[allow(dead_code)]
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

#[allow(dead_code)]
pub const SVG_BYTES: &[u8] = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"/>"#;

/// In-memory fetcher with a fixed route table
///
/// Unknown URLs answer with a 404. Every call is counted per URL.
#[derive(Default)]
pub struct MockFetcher {
    routes: HashMap<String, Result<(Vec<u8>, String), u16>>,
    calls: Mutex<HashMap<String, usize>>,
    delays: HashMap<String, Duration>,
}

#[allow(dead_code)]
impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, bytes: &[u8], content_type: &str) -> Self {
        self.routes
            .insert(url.to_string(), Ok((bytes.to_vec(), content_type.to_string())));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.routes.insert(url.to_string(), Err(status));
        self
    }

    /// Hold the answer for `url` back by `delay`
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Calls made for `url`
    pub fn calls(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl Fetcher for MockFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            *self.calls.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
            if let Some(delay) = self.delays.get(url) {
                tokio::time::sleep(*delay).await;
            }
            match self.routes.get(url) {
                Some(Ok((bytes, content_type))) => {
                    FetchOutcome::success(url, bytes.clone(), content_type.clone())
                }
                Some(Err(status)) => FetchOutcome::failure(
                    url,
                    FetchError::HttpStatus {
                        url: url.to_string(),
                        status: *status,
                    },
                ),
                None => FetchOutcome::failure(
                    url,
                    FetchError::HttpStatus {
                        url: url.to_string(),
                        status: 404,
                    },
                ),
            }
        })
    }
}

/// Renderer returning a fixed document
#[allow(dead_code)]
pub struct FixedRenderer {
    pub html: String,
    pub final_url: String,
}

impl PageRenderer for FixedRenderer {
    fn render<'a>(&'a self, _url: &'a str) -> RenderFuture<'a> {
        Box::pin(async move {
            Ok(RenderedPage {
                html: self.html.clone(),
                final_url: self.final_url.clone(),
            })
        })
    }
}

/// Renderer that always fails to load the page
#[allow(dead_code)]
pub struct FailingRenderer;

impl PageRenderer for FailingRenderer {
    fn render<'a>(&'a self, url: &'a str) -> RenderFuture<'a> {
        Box::pin(async move {
            Err(StandaloneError::PageLoad {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })
        })
    }
}

/// Creates a test HTML document with the given head and body content
#[allow(dead_code)]
pub fn create_test_html(head: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n{head}\n</head>\n<body>\n{body}\n</body>\n</html>"
    )
}

/// Decode the payload of a base64 `data:` URL
#[allow(dead_code)]
pub fn decode_data_url(data_url: &str) -> (String, Vec<u8>) {
    use base64::Engine;
    let rest = data_url.strip_prefix("data:").expect("not a data url");
    let (mime, payload) = rest.split_once(";base64,").expect("not base64");
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .expect("invalid base64");
    (mime.to_string(), bytes)
}

/// Every `attr="..."` value in `html`, in document order
#[allow(dead_code)]
pub fn attribute_values(html: &str, attr: &str) -> Vec<String> {
    let needle = format!(" {attr}=\"");
    let mut values = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find(&needle) {
        let after = &rest[start + needle.len()..];
        let Some(end) = after.find('"') else { break };
        values.push(after[..end].to_string());
        rest = &after[end..];
    }
    values
}

/// Mock server route returning `body` with `content_type`
#[allow(dead_code)]
pub async fn create_resource_mock(server: &mut Server, path: &str, body: &[u8], content_type: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", content_type)
        .with_body(body)
        .create_async()
        .await
}

/// Mock server route answering with an error status
#[allow(dead_code)]
pub async fn create_error_mock(server: &mut Server, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .with_body(format!("Error {status}"))
        .create_async()
        .await
}

/// Helper to build a test URL against the mock server
#[allow(dead_code)]
pub fn test_url(server: &Server, path: &str) -> String {
    format!("{}{}", server.url(), path)
}
