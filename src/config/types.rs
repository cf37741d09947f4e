//! Core configuration types for standalone conversions
//!
//! This module contains the `StandaloneConfig` struct and the rewrite mode
//! that decides what happens to every resolved resource reference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// What to do with each external resource reference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AssetMode {
    /// Replace references with inline `data:` URLs
    #[default]
    Embed,
    /// Save resources into an asset folder and point references at the files
    Download,
    /// Leave every reference untouched
    Hotlink,
}

impl AssetMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AssetMode::Embed => "embed",
            AssetMode::Download => "download",
            AssetMode::Hotlink => "hotlink",
        }
    }
}

impl fmt::Display for AssetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for one page conversion
///
/// Fixed for the whole conversion: the rewrite mode never changes between
/// passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandaloneConfig {
    pub(crate) asset_mode: AssetMode,

    /// Directory on disk that receives `css/` and `images/` in download mode
    pub(crate) assets_dir: Option<PathBuf>,

    /// Prefix written into the document in front of `<category>/<file>`
    ///
    /// Usually the asset folder's path relative to the output file.
    pub(crate) assets_href: Option<String>,

    pub(crate) project_name: String,
    pub(crate) include_watermark: bool,
    pub(crate) remove_scripts: bool,

    /// Width of the stylesheet fetch pool (at least 1)
    pub(crate) max_workers: usize,

    /// Per-resource fetch timeout
    ///
    /// Default: 15 seconds
    pub(crate) fetch_timeout: Duration,

    /// Largest body accepted for a single resource
    ///
    /// Default: 25 MiB
    pub(crate) max_resource_bytes: usize,

    /// Memoize fetch outcomes by URL for the duration of one conversion
    pub(crate) cache_resources: bool,

    pub(crate) user_agent: String,

    /// Try to dismiss cookie-consent banners before capturing the page
    pub(crate) close_cookie_banner: bool,
    pub(crate) headless: bool,

    /// Timeout for the renderer's navigation
    ///
    /// Default: 30 seconds
    pub(crate) page_load_timeout: Duration,
}
