//! `<img src>` and inline `style` background passes

use fancy_regex::Regex as FancyRegex;
use regex::Regex;
use std::sync::LazyLock;

use super::super::collector::StatsCollector;
use super::super::strategy::ReferenceResolver;
use super::super::types::{ResourceCategory, ResourceReference};
use crate::fetch::Fetcher;

/// Group 3 is the URL; the closing quote must match the opening one
static IMG_SRC: LazyLock<FancyRegex> = LazyLock::new(|| {
    FancyRegex::new(r#"(?i)(<img[^>]+src=)(["'])([^"']+)(\2[^>]*>)"#)
        .expect("IMG_SRC: hardcoded regex is valid")
});

/// First `url(...)` inside a `style` attribute, group 2 is the URL
static STYLE_BACKGROUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(style=["'][^"']*?url\(["']?)([^"')\s]+)(["']?\)[^"']*["'])"#)
        .expect("STYLE_BACKGROUND: hardcoded regex is valid")
});

/// `src` references of `<img>` elements
#[must_use]
pub fn collect_img_sources(html: &str) -> Vec<ResourceReference> {
    IMG_SRC
        .captures_iter(html)
        .filter_map(|caps| {
            let caps = caps
                .map_err(|e| log::debug!("Skipping <img> match: {e}"))
                .ok()?;
            let src = caps.get(3)?;
            Some(ResourceReference::new(
                ResourceCategory::ImageSrc,
                src.as_str(),
                src.start()..src.end(),
            ))
        })
        .collect()
}

/// First `url(...)` of every `style` attribute
#[must_use]
pub fn collect_style_backgrounds(html: &str) -> Vec<ResourceReference> {
    STYLE_BACKGROUND
        .captures_iter(html)
        .filter_map(|caps| {
            let url = caps.get(2)?;
            Some(ResourceReference::new(
                ResourceCategory::StyleBackground,
                url.as_str(),
                url.range(),
            ))
        })
        .collect()
}

pub async fn rewrite_img_sources<F: Fetcher + ?Sized>(
    html: &str,
    resolver: &ReferenceResolver<'_, F>,
    collector: &mut StatsCollector,
) -> String {
    let references = collect_img_sources(html);
    log::info!("Processing {} <img> sources", references.len());
    resolver.rewrite_references(html, references, collector).await
}

pub async fn rewrite_style_backgrounds<F: Fetcher + ?Sized>(
    html: &str,
    resolver: &ReferenceResolver<'_, F>,
    collector: &mut StatsCollector,
) -> String {
    let references = collect_style_backgrounds(html);
    log::info!("Processing {} inline style backgrounds", references.len());
    resolver.rewrite_references(html, references, collector).await
}
