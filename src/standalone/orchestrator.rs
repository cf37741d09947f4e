//! Standalone conversion orchestration
//!
//! Runs the document passes in a fixed order over the rendered HTML and
//! collects statistics and per-resource errors along the way.

use chrono::{DateTime, Local};

use super::collector::StatsCollector;
use super::passes;
use super::strategy::{ReferenceResolver, RewriteStrategy};
use super::types::{ConversionResult, StandaloneError};
use crate::config::StandaloneConfig;
use crate::fetch::{CachingFetcher, Fetcher};

/// Turn `html` (rendered from `base_url`) into a standalone document
///
/// Fails only on configuration problems; unreachable resources are recorded
/// in [`ConversionResult::errors`] and keep their original references.
pub async fn create_standalone_html<F: Fetcher>(
    html: &str,
    base_url: &str,
    config: &StandaloneConfig,
    fetcher: &F,
) -> Result<ConversionResult, StandaloneError> {
    create_standalone_html_at(html, base_url, config, fetcher, Local::now()).await
}

/// [`create_standalone_html`] with an explicit timestamp for the injected markers
pub async fn create_standalone_html_at<F: Fetcher>(
    html: &str,
    base_url: &str,
    config: &StandaloneConfig,
    fetcher: &F,
    now: DateTime<Local>,
) -> Result<ConversionResult, StandaloneError> {
    let strategy = RewriteStrategy::from_config(config)?;
    let mut collector = StatsCollector::new(base_url, html.len());

    let cache;
    let fetcher: &dyn Fetcher = if config.cache_resources() {
        cache = CachingFetcher::new(fetcher);
        &cache
    } else {
        fetcher
    };

    log::debug!(
        "Starting standalone conversion for {base_url} ({} mode, {} bytes)",
        config.asset_mode(),
        html.len()
    );

    let mut html = if config.remove_scripts() {
        passes::strip_scripts(html)
    } else {
        html.to_string()
    };
    html = passes::normalize_lazy_loading(&html);

    if strategy.fetches_resources() {
        let resolver = ReferenceResolver::new(fetcher, &strategy, base_url);

        html = passes::rewrite_stylesheets(&html, &resolver, config.max_workers(), &mut collector).await;
        html = passes::rewrite_img_sources(&html, &resolver, &mut collector).await;
        html = passes::rewrite_srcset_entries(&html, &resolver, &mut collector).await;
        html = passes::rewrite_style_backgrounds(&html, &resolver, &mut collector).await;
        html = passes::rewrite_picture_sources(&html, &resolver, &mut collector).await;
    }

    html = passes::inject_scroll_fix(&html);
    if config.include_watermark() {
        html = passes::inject_watermark(&html, config.project_name(), now);
    }
    html = passes::inject_metadata_comment(&html, config.project_name(), base_url, now);

    let (stats, errors) = collector.finish(html.len());
    log::info!(
        "Standalone conversion finished: {} stylesheets, {} images, {} css urls inlined, {} assets downloaded, {} failed",
        stats.stylesheets_inlined,
        stats.images_inlined,
        stats.css_urls_inlined,
        stats.assets_downloaded,
        stats.resources_failed
    );

    Ok(ConversionResult { html, stats, errors })
}
