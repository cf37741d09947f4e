//! Stylesheet text handling: decoding and `url(...)` inlining

use encoding_rs::{Encoding, WINDOWS_1252};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use super::splice::splice;
use super::strategy::retrieve;
use super::types::{ErrorRecord, ResourceCategory};
use crate::fetch::Fetcher;
use crate::mime::{resolve_mime, to_data_url};
use crate::utils::is_data_url;

/// `url(...)` with optional quotes; backslash escapes such as `\e` stay part of the URL
static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*["']?([^"'()\s\\]+(?:\\.[^"'()\s\\]*)*)["']?\s*\)"#)
        .expect("CSS_URL: hardcoded regex is valid")
});

/// Decode fetched stylesheet bytes
///
/// A byte-order mark wins; otherwise strict UTF-8, then Windows-1252 (a
/// superset of Latin-1 for printable text), then lossy UTF-8.
#[must_use]
pub fn decode_stylesheet(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let (text, had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
    if had_errors {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    text.into_owned()
}

/// Outcome of inlining the `url(...)` references of one stylesheet
#[derive(Debug, Clone, Default)]
pub struct CssInlineReport {
    pub css: String,
    /// References replaced by data URLs
    pub inlined: usize,
    /// One record per reference that could not be fetched
    pub failures: Vec<ErrorRecord>,
    /// Network retrievals performed (cache hits excluded)
    pub fetches: usize,
}

/// Replace every fetchable `url(...)` in `css` with an inline data URL
///
/// References are resolved against `stylesheet_url`, not the page URL. A
/// reference that fails keeps its original text.
pub async fn inline_css_urls<F: Fetcher + ?Sized>(
    css: &str,
    stylesheet_url: &str,
    fetcher: &F,
) -> CssInlineReport {
    let mut report = CssInlineReport::default();
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    let references: Vec<(Range<usize>, String)> = CSS_URL
        .captures_iter(css)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let url = caps.get(1)?.as_str();
            Some((whole.range(), url.to_string()))
        })
        .collect();

    for (range, raw_url) in references {
        if raw_url.is_empty() || is_data_url(&raw_url) || raw_url.starts_with('#') {
            continue;
        }

        let clean_url = raw_url.replace('\\', "");
        match retrieve(fetcher, stylesheet_url, &clean_url, ResourceCategory::CssUrl).await {
            Ok(retrieved) => {
                if !retrieved.from_cache {
                    report.fetches += 1;
                }
                let mime = resolve_mime(&retrieved.absolute_url, &retrieved.resource.content_type);
                let data_url = to_data_url(&mime, &retrieved.resource.bytes);
                edits.push((range, format!("url(\"{data_url}\")")));
                report.inlined += 1;
            }
            Err((record, counted)) => {
                if counted {
                    report.fetches += 1;
                }
                log::debug!("Keeping url({raw_url}) in {stylesheet_url}: {}", record.reason);
                report.failures.push(record);
            }
        }
    }

    report.css = splice(css, edits);
    report
}
