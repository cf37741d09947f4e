//! Type definitions for standalone conversion

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;

/// Where a resource reference was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceCategory {
    /// `<link rel="stylesheet" href>`
    StylesheetLink,
    /// `<img src>`
    ImageSrc,
    /// One candidate of a `srcset` attribute outside `<source>`
    SrcsetEntry,
    /// First `url(...)` inside a `style="..."` attribute
    StyleBackground,
    /// One candidate of a `<source srcset>` attribute
    PictureSource,
    /// `url(...)` inside a fetched stylesheet
    CssUrl,
}

impl ResourceCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceCategory::StylesheetLink => "stylesheet-link",
            ResourceCategory::ImageSrc => "image-src",
            ResourceCategory::SrcsetEntry => "srcset-entry",
            ResourceCategory::StyleBackground => "style-background",
            ResourceCategory::PictureSource => "picture-source",
            ResourceCategory::CssUrl => "css-url",
        }
    }

    /// Sub-folder of the asset folder that receives this category in download mode
    #[must_use]
    pub fn asset_subdir(self) -> &'static str {
        match self {
            ResourceCategory::StylesheetLink => "css",
            _ => "images",
        }
    }

    /// True for the categories counted as images in the statistics
    #[must_use]
    pub fn is_image(self) -> bool {
        matches!(
            self,
            ResourceCategory::ImageSrc
                | ResourceCategory::SrcsetEntry
                | ResourceCategory::StyleBackground
                | ResourceCategory::PictureSource
        )
    }
}

impl std::fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external resource reference discovered in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    pub category: ResourceCategory,
    /// URL text exactly as it appears in the document
    pub raw_url: String,
    /// Byte range of `raw_url` in the text the pass scanned
    pub span: Range<usize>,
    /// Width/density descriptor of a srcset candidate, verbatim
    pub descriptor: Option<String>,
}

impl ResourceReference {
    #[must_use]
    pub fn new(category: ResourceCategory, raw_url: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            category,
            raw_url: raw_url.into(),
            span,
            descriptor: None,
        }
    }

    #[must_use]
    pub fn with_descriptor(mut self, descriptor: Option<String>) -> Self {
        self.descriptor = descriptor;
        self
    }
}

/// A resource that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub category: ResourceCategory,
    pub url: String,
    pub reason: String,
}

impl ErrorRecord {
    #[must_use]
    pub fn new(category: ResourceCategory, url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            category,
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} - {}", self.category, self.url, self.reason)
    }
}

/// Counters describing one conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub stylesheets_inlined: usize,
    pub images_inlined: usize,
    pub css_urls_inlined: usize,
    pub assets_downloaded: usize,
    pub resources_failed: usize,
    /// Network retrievals actually performed (resolution-cache hits excluded)
    pub fetches: usize,
    pub total_size_before: usize,
    pub total_size_after: usize,
    pub source_url: String,
}

/// Output of [`create_standalone_html`](super::create_standalone_html)
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub html: String,
    pub stats: ConversionStats,
    pub errors: Vec<ErrorRecord>,
}

/// Payload describing a saved snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPage {
    pub success: bool,
    pub output_path: PathBuf,
    /// Set in download mode
    pub assets_dir: Option<PathBuf>,
    pub stats: ConversionStats,
    pub errors: Vec<ErrorRecord>,
}

/// Fatal conversion errors
///
/// Per-resource problems never end up here; they are recorded as
/// [`ErrorRecord`]s and the conversion carries on.
#[derive(Debug, thiserror::Error)]
pub enum StandaloneError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP client unavailable: {0}")]
    ClientUnavailable(String),

    #[error("Renderer unavailable: {0}")]
    RendererUnavailable(String),

    #[error("Page load failed for {url}: {reason}")]
    PageLoad { url: String, reason: String },

    #[error("Failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
