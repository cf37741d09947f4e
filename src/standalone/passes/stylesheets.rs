//! External stylesheet pass
//!
//! The only concurrent stage. Workers fetch, decode and (in embed mode)
//! inline each stylesheet independently and hand back a record; the
//! coordinator applies records to the document and folds their stats once
//! the pool has drained.

use futures::stream::{self, StreamExt};
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use super::super::collector::{Contribution, StatsCollector};
use super::super::css::{decode_stylesheet, inline_css_urls};
use super::super::splice::splice;
use super::super::strategy::{retrieve, ReferenceResolver, RewriteStrategy};
use super::super::types::{ErrorRecord, ResourceCategory};
use crate::fetch::Fetcher;
use crate::utils::is_data_url;

/// Detection patterns, group 1 is the raw href
static STYLESHEET_LINKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // rel before href
        r#"(?i)<link[^>]+rel=["']stylesheet["'][^>]+href=["']([^"']+)["'][^>]*>"#,
        // href before rel
        r#"(?i)<link[^>]+href=["']([^"']+)["'][^>]+rel=["']stylesheet["'][^>]*>"#,
        // unquoted rel
        r#"(?i)<link[^>]+rel=stylesheet[^>]+href=["']([^"']+)["'][^>]*>"#,
        // any .css href
        r#"(?i)<link[^>]+href=["']([^"']+\.css[^"']*)["'][^>]*>"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("STYLESHEET_LINKS: hardcoded regex is valid"))
    .collect()
});

/// One external stylesheet reference in the source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetLink {
    /// Raw href exactly as written
    pub href: String,
    /// Byte span of the whole `<link>` tag
    pub span: Range<usize>,
}

/// External stylesheet links in document order
///
/// Each href is kept once, at its first `<link>`. `data:` hrefs are excluded,
/// and a tag already claimed by an earlier pattern is not reported again.
#[must_use]
pub fn collect_stylesheet_links(html: &str) -> Vec<StylesheetLink> {
    let mut seen = HashSet::new();
    let mut links: Vec<StylesheetLink> = Vec::new();

    for pattern in STYLESHEET_LINKS.iter() {
        for caps in pattern.captures_iter(html) {
            let (Some(tag), Some(href)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let href = href.as_str();
            if is_data_url(href) || seen.contains(href) {
                continue;
            }
            let span = tag.range();
            if links
                .iter()
                .any(|link| link.span.start < span.end && span.start < link.span.end)
            {
                continue;
            }
            seen.insert(href.to_string());
            links.push(StylesheetLink {
                href: href.to_string(),
                span,
            });
        }
    }

    links.sort_by_key(|link| link.span.start);
    links
}

/// Raw hrefs of external stylesheets, in document order
#[must_use]
pub fn collect_stylesheet_hrefs(html: &str) -> Vec<String> {
    collect_stylesheet_links(html)
        .into_iter()
        .map(|link| link.href)
        .collect()
}

/// What a worker produced for one stylesheet
#[derive(Debug)]
enum StylesheetOutcome {
    Inlined {
        css: String,
        css_urls_inlined: usize,
        css_failures: Vec<ErrorRecord>,
    },
    Stored(String),
    Failed(ErrorRecord),
    Skipped,
}

#[derive(Debug)]
struct StylesheetRecord {
    index: usize,
    href: String,
    span: Range<usize>,
    fetches: usize,
    outcome: StylesheetOutcome,
}

async fn process_stylesheet<F: Fetcher + ?Sized>(
    index: usize,
    link: StylesheetLink,
    resolver: &ReferenceResolver<'_, F>,
) -> StylesheetRecord {
    let mut record = StylesheetRecord {
        index,
        href: link.href,
        span: link.span,
        fetches: 0,
        outcome: StylesheetOutcome::Skipped,
    };

    let retrieved = match retrieve(
        resolver.fetcher(),
        resolver.base_url(),
        &record.href,
        ResourceCategory::StylesheetLink,
    )
    .await
    {
        Ok(retrieved) => retrieved,
        Err((error, counted)) => {
            record.fetches += usize::from(counted);
            record.outcome = StylesheetOutcome::Failed(error);
            return record;
        }
    };
    record.fetches += usize::from(!retrieved.from_cache);

    record.outcome = match resolver.strategy() {
        RewriteStrategy::Embed => {
            let css = decode_stylesheet(&retrieved.resource.bytes);
            log::debug!("Downloaded CSS content length: {} chars", css.len());
            let report = inline_css_urls(&css, &retrieved.absolute_url, resolver.fetcher()).await;
            record.fetches += report.fetches;
            StylesheetOutcome::Inlined {
                css: report.css,
                css_urls_inlined: report.inlined,
                css_failures: report.failures,
            }
        }
        RewriteStrategy::Download(store) => {
            match store
                .store(
                    &retrieved.resource.bytes,
                    &retrieved.absolute_url,
                    ResourceCategory::StylesheetLink,
                )
                .await
            {
                Ok(path) => StylesheetOutcome::Stored(path),
                Err(e) => StylesheetOutcome::Failed(ErrorRecord::new(
                    ResourceCategory::StylesheetLink,
                    retrieved.absolute_url,
                    e.to_string(),
                )),
            }
        }
        RewriteStrategy::Hotlink => StylesheetOutcome::Skipped,
    };

    record
}

/// Fetch every external stylesheet through a bounded pool and substitute it
///
/// Each record replaces the `<link>` span captured at collection time, so the
/// order in which fetches complete does not affect which tag is rewritten.
pub async fn rewrite_stylesheets<F: Fetcher + ?Sized>(
    html: &str,
    resolver: &ReferenceResolver<'_, F>,
    max_workers: usize,
    collector: &mut StatsCollector,
) -> String {
    let links = collect_stylesheet_links(html);
    if links.is_empty() {
        return html.to_string();
    }
    log::info!(
        "Processing {} stylesheets with up to {} workers",
        links.len(),
        max_workers
    );

    let mut records: Vec<StylesheetRecord> = stream::iter(links.into_iter().enumerate())
        .map(|(index, link)| process_stylesheet(index, link, resolver))
        .buffer_unordered(max_workers.max(1))
        .collect()
        .await;
    // Completion order to document order
    records.sort_by_key(|record| record.index);

    let mut edits = Vec::new();
    for record in records {
        collector.add_fetches(record.fetches);

        match record.outcome {
            StylesheetOutcome::Inlined {
                css,
                css_urls_inlined,
                css_failures,
            } => {
                edits.push((
                    record.span,
                    format!("<style>/* Inlined: {} */\n{css}</style>", record.href),
                ));
                collector.record_success(Contribution::Inlined(ResourceCategory::StylesheetLink));
                collector.add_css_urls_inlined(css_urls_inlined);
                for failure in css_failures {
                    collector.record_failure(failure);
                }
                log::info!("Successfully inlined CSS from: {}", record.href);
            }
            StylesheetOutcome::Stored(path) => {
                edits.push((record.span, format!(r#"<link rel="stylesheet" href="{path}">"#)));
                collector.record_success(Contribution::Downloaded);
            }
            StylesheetOutcome::Failed(error) => collector.record_failure(error),
            StylesheetOutcome::Skipped => {}
        }
    }

    splice(html, edits)
}
