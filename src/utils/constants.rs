//! Shared configuration constants for standalone page snapshots
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

use std::time::Duration;

/// Chrome user agent string sent with every resource fetch
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
///
/// Some CDNs refuse requests without a browser-like identity, so the
/// fetcher and the renderer present the same string.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Per-resource fetch timeout: 15 seconds
///
/// A hanging resource only delays its own substitution. Sequential passes
/// are bounded by the sum of these timeouts.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Width of the stylesheet fetch pool: 10 concurrent requests
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Maximum body size for a single resource: 25 MiB
///
/// Anything larger is almost certainly not something that belongs inside
/// a data URL, and would balloon the output document.
pub const DEFAULT_MAX_RESOURCE_BYTES: usize = 25 * 1024 * 1024;

/// Project name used in the watermark and metadata comment
pub const DEFAULT_PROJECT_NAME: &str = "Preview";

/// Number of hex characters of the URL hash used for asset filenames
pub const ASSET_HASH_LEN: usize = 12;

/// Maximum length of an asset file extension (without the dot)
pub const ASSET_EXTENSION_MAX_LEN: usize = 10;

/// Maximum number of characters of the source host shown in the metadata comment
pub const SOURCE_DOMAIN_MAX_LEN: usize = 50;

/// Number of error records shown in the end-of-run summary
pub const ERROR_PREVIEW_LEN: usize = 5;

/// Page navigation timeout for the browser renderer: 30 seconds
pub const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Browser viewport used while rendering
pub const VIEWPORT_WIDTH: u32 = 1920;
pub const VIEWPORT_HEIGHT: u32 = 1080;
