//! Statistics and error collection for one conversion
//!
//! Owned by the coordinating task. Concurrent stages hand back per-item
//! records which are folded in once the stage has drained.

use super::types::{ConversionStats, ErrorRecord, ResourceCategory};

/// What a single resolved reference contributed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    Inlined(ResourceCategory),
    Downloaded,
}

#[derive(Debug, Default)]
pub struct StatsCollector {
    stats: ConversionStats,
    errors: Vec<ErrorRecord>,
}

impl StatsCollector {
    #[must_use]
    pub fn new(source_url: &str, size_before: usize) -> Self {
        Self {
            stats: ConversionStats {
                source_url: source_url.to_string(),
                total_size_before: size_before,
                ..ConversionStats::default()
            },
            errors: Vec::new(),
        }
    }

    pub fn record_success(&mut self, contribution: Contribution) {
        match contribution {
            Contribution::Downloaded => self.stats.assets_downloaded += 1,
            Contribution::Inlined(ResourceCategory::StylesheetLink) => {
                self.stats.stylesheets_inlined += 1;
            }
            Contribution::Inlined(ResourceCategory::CssUrl) => self.stats.css_urls_inlined += 1,
            Contribution::Inlined(_) => self.stats.images_inlined += 1,
        }
    }

    /// Count a resource failure and append its error record
    pub fn record_failure(&mut self, error: ErrorRecord) {
        log::warn!("Resource failed ({}): {} - {}", error.category, error.url, error.reason);
        self.stats.resources_failed += 1;
        self.errors.push(error);
    }

    /// Count a retrieval that actually went to the network
    pub fn record_fetch(&mut self, from_cache: bool) {
        if !from_cache {
            self.stats.fetches += 1;
        }
    }

    pub fn add_css_urls_inlined(&mut self, count: usize) {
        self.stats.css_urls_inlined += count;
    }

    pub fn add_fetches(&mut self, count: usize) {
        self.stats.fetches += count;
    }

    #[must_use]
    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    #[must_use]
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    #[must_use]
    pub fn finish(mut self, size_after: usize) -> (ConversionStats, Vec<ErrorRecord>) {
        self.stats.total_size_after = size_after;
        (self.stats, self.errors)
    }
}
