//! Local asset folder used in download mode
//!
//! Files are named after a hash of the absolute URL, so the same URL always
//! lands on the same file and repeated stores simply overwrite it.

use std::path::{Path, PathBuf};

use super::types::ResourceCategory;
use crate::utils::string_utils::safe_truncate_chars;
use crate::utils::{ASSET_EXTENSION_MAX_LEN, ASSET_HASH_LEN};

#[derive(Debug, thiserror::Error)]
pub enum AssetStoreError {
    #[error("Failed to create asset directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write asset {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Asset folder with separate on-disk root and in-document prefix
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    href_prefix: String,
}

impl AssetStore {
    /// `root` is where files are written, `href_prefix` what the document links to
    pub fn new(root: impl Into<PathBuf>, href_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            href_prefix: href_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` for `url` and return the path to put into the document
    pub async fn store(
        &self,
        bytes: &[u8],
        url: &str,
        category: ResourceCategory,
    ) -> Result<String, AssetStoreError> {
        let subdir = category.asset_subdir();
        let filename = asset_filename(url);

        let dir = self.root.join(subdir);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| AssetStoreError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        let path = dir.join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| AssetStoreError::Write {
                path: path.clone(),
                source,
            })?;

        log::debug!("Stored {url} as {}", path.display());
        Ok(format!("{}/{subdir}/{filename}", self.href_prefix))
    }
}

/// `<12 hex chars of xxh3(url)><.ext>`
#[must_use]
pub fn asset_filename(url: &str) -> String {
    let digest = hex::encode(xxhash_rust::xxh3::xxh3_128(url.as_bytes()).to_be_bytes());
    let hash = &digest[..ASSET_HASH_LEN];
    format!("{hash}{}", asset_extension(url))
}

/// Extension of the last path segment, dot included, or empty
///
/// Longer extensions are cut to `ASSET_EXTENSION_MAX_LEN` characters.
fn asset_extension(url: &str) -> String {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    let segment = path.rsplit('/').next().unwrap_or_default();
    let Some((_, ext)) = segment.rsplit_once('.') else {
        return String::new();
    };

    let ext = safe_truncate_chars(ext, ASSET_EXTENSION_MAX_LEN);
    // Only characters that are safe in a file name on every platform
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return String::new();
    }
    format!(".{ext}")
}
