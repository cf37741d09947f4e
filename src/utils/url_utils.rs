//! URL and path manipulation utilities.
//!
//! This module provides functions for resolving resource references against
//! the page URL and for deriving names from URLs.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use url::Url;

use super::string_utils::safe_truncate_chars;

/// Resolve a potentially relative URL against a base URL
///
/// Query strings are kept as written, so the fetched URL and the asset name
/// derived from it match the reference in the document.
pub fn resolve_url(base_url: &str, url: &str) -> Result<String> {
    let base = Url::parse(base_url).context("Invalid base URL")?;
    let resolved = base.join(url).context("Failed to resolve URL")?;
    Ok(resolved.to_string())
}

/// Check whether a reference already carries its bytes inline
#[inline]
#[must_use]
pub fn is_data_url(url: &str) -> bool {
    url.trim_start()
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Host of the page, truncated for display in the metadata comment
///
/// Falls back to the raw URL text when it has no host.
#[must_use]
pub fn display_domain(url: &str, max_chars: usize) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }));

    match host {
        Some(host) => safe_truncate_chars(&host, max_chars).to_string(),
        None => safe_truncate_chars(url, max_chars).to_string(),
    }
}

/// Default output file for a page: `<host>_<timestamp>_standalone.html`
///
/// Dots and colons in the host become underscores so the name stays a
/// single portable path component.
pub fn default_output_path(url: &str, now: DateTime<Local>) -> Result<PathBuf> {
    let parsed = Url::parse(url).context("Invalid page URL")?;
    let host = match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => "page".to_string(),
    };
    let domain = host.replace(['.', ':'], "_");
    let file_name = format!(
        "{}_{}_standalone.html",
        sanitize_filename::sanitize(domain),
        now.format("%Y%m%d_%H%M%S")
    );
    Ok(PathBuf::from(file_name))
}

/// Asset folder used next to an output file in download mode
///
/// Returns `(directory on disk, prefix written into the document)`. The
/// prefix is relative to the output file so the snapshot can be moved as a
/// unit.
#[must_use]
pub fn assets_folder_for(output_path: &Path) -> (PathBuf, String) {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "standalone".to_string());
    let folder = format!("{stem}_assets");
    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(&folder),
        _ => PathBuf::from(&folder),
    };
    (dir, folder)
}
