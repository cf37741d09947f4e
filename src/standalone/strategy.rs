//! Rewrite strategies and per-reference resolution
//!
//! Every fetching pass funnels its references through a
//! [`ReferenceResolver`]: resolve against the page URL, fetch, then either
//! inline the bytes, store them in the asset folder, or leave the reference
//! alone.

use std::ops::Range;

use super::asset_store::AssetStore;
use super::collector::{Contribution, StatsCollector};
use super::splice::splice;
use super::types::{ErrorRecord, ResourceCategory, ResourceReference, StandaloneError};
use crate::config::{AssetMode, StandaloneConfig};
use crate::fetch::{FetchedResource, Fetcher};
use crate::mime::{resolve_mime, to_data_url};
use crate::utils::{is_data_url, resolve_url};

/// Mode-specific substitution behavior, fixed for a conversion
#[derive(Debug, Clone)]
pub enum RewriteStrategy {
    /// Inline every resolved resource as a base64 `data:` URL
    Embed,
    /// Store every resolved resource in the asset folder
    Download(AssetStore),
    /// Keep every reference as it is
    Hotlink,
}

impl RewriteStrategy {
    pub fn from_config(config: &StandaloneConfig) -> Result<Self, StandaloneError> {
        match config.asset_mode() {
            AssetMode::Embed => Ok(RewriteStrategy::Embed),
            AssetMode::Hotlink => Ok(RewriteStrategy::Hotlink),
            AssetMode::Download => {
                let root = config.assets_dir().ok_or_else(|| {
                    StandaloneError::Config("download mode requires an assets folder".to_string())
                })?;
                let href = config.assets_href().ok_or_else(|| {
                    StandaloneError::Config("download mode requires an assets href prefix".to_string())
                })?;
                Ok(RewriteStrategy::Download(AssetStore::new(root, href)))
            }
        }
    }

    /// False in hotlink mode, where the fetching passes are skipped entirely
    #[must_use]
    pub fn fetches_resources(&self) -> bool {
        !matches!(self, RewriteStrategy::Hotlink)
    }
}

/// Result of resolving one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// Left alone without a fetch (already inline, or hotlink mode)
    Skipped,
    /// Replace the reference text with `value`
    Replaced {
        value: String,
        contribution: Contribution,
    },
    /// Original text stays, the failure is recorded
    Failed(ErrorRecord),
}

/// A successful retrieval, with the absolute URL it was fetched from
#[derive(Debug)]
pub(crate) struct Retrieved {
    pub absolute_url: String,
    pub resource: FetchedResource,
    pub from_cache: bool,
}

/// Resolve `raw_url` against `base_url` and fetch it once
///
/// The `bool` in the error tuple tells whether a network fetch was attempted
/// and not served from cache, so callers can keep the fetch counter honest.
pub(crate) async fn retrieve<F: Fetcher + ?Sized>(
    fetcher: &F,
    base_url: &str,
    raw_url: &str,
    category: ResourceCategory,
) -> Result<Retrieved, (ErrorRecord, bool)> {
    let absolute_url = resolve_url(base_url, raw_url).map_err(|e| {
        (
            ErrorRecord::new(category, raw_url, format!("invalid reference: {e:#}")),
            false,
        )
    })?;

    let outcome = fetcher.fetch(&absolute_url).await;
    let counted = !outcome.from_cache;
    match outcome.result {
        Ok(resource) => Ok(Retrieved {
            absolute_url,
            resource,
            from_cache: outcome.from_cache,
        }),
        Err(e) => Err((ErrorRecord::new(category, absolute_url, e.to_string()), counted)),
    }
}

/// Resolves references of one document against its base URL
pub struct ReferenceResolver<'a, F: ?Sized> {
    fetcher: &'a F,
    strategy: &'a RewriteStrategy,
    base_url: &'a str,
}

impl<'a, F: Fetcher + ?Sized> ReferenceResolver<'a, F> {
    pub fn new(fetcher: &'a F, strategy: &'a RewriteStrategy, base_url: &'a str) -> Self {
        Self {
            fetcher,
            strategy,
            base_url,
        }
    }

    #[must_use]
    pub fn strategy(&self) -> &RewriteStrategy {
        self.strategy
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
    }

    #[must_use]
    pub fn fetcher(&self) -> &F {
        self.fetcher
    }

    /// Compute the replacement for one reference
    ///
    /// Counts a network fetch in `collector` when one was made. Success and
    /// failure accounting is left to the caller, which knows whether the
    /// replacement actually landed in the document.
    pub async fn resolve(
        &self,
        reference: &ResourceReference,
        collector: &mut StatsCollector,
    ) -> RewriteOutcome {
        if is_data_url(&reference.raw_url) || !self.strategy.fetches_resources() {
            return RewriteOutcome::Skipped;
        }

        let retrieved = match retrieve(self.fetcher, self.base_url, &reference.raw_url, reference.category).await {
            Ok(retrieved) => retrieved,
            Err((record, counted)) => {
                if counted {
                    collector.record_fetch(false);
                }
                return RewriteOutcome::Failed(record);
            }
        };
        collector.record_fetch(retrieved.from_cache);

        match self.strategy {
            RewriteStrategy::Embed => {
                let mime = resolve_mime(&retrieved.absolute_url, &retrieved.resource.content_type);
                RewriteOutcome::Replaced {
                    value: to_data_url(&mime, &retrieved.resource.bytes),
                    contribution: Contribution::Inlined(reference.category),
                }
            }
            RewriteStrategy::Download(store) => {
                match store
                    .store(&retrieved.resource.bytes, &retrieved.absolute_url, reference.category)
                    .await
                {
                    Ok(path) => RewriteOutcome::Replaced {
                        value: path,
                        contribution: Contribution::Downloaded,
                    },
                    Err(e) => RewriteOutcome::Failed(ErrorRecord::new(
                        reference.category,
                        retrieved.absolute_url,
                        e.to_string(),
                    )),
                }
            }
            RewriteStrategy::Hotlink => RewriteOutcome::Skipped,
        }
    }

    /// Resolve `references` one after another and splice the results into `text`
    ///
    /// Reference spans index into `text`. Failed references keep their
    /// original text.
    pub async fn rewrite_references(
        &self,
        text: &str,
        references: Vec<ResourceReference>,
        collector: &mut StatsCollector,
    ) -> String {
        let mut edits: Vec<(Range<usize>, String)> = Vec::with_capacity(references.len());

        for reference in references {
            match self.resolve(&reference, collector).await {
                RewriteOutcome::Skipped => {}
                RewriteOutcome::Replaced {
                    value,
                    contribution,
                } => {
                    log::debug!("Rewrote {} reference: {}", reference.category, reference.raw_url);
                    collector.record_success(contribution);
                    edits.push((reference.span, value));
                }
                RewriteOutcome::Failed(record) => collector.record_failure(record),
            }
        }

        splice(text, edits)
    }
}
