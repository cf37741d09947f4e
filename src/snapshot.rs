//! Render a URL, convert it and write the standalone file

use chrono::Local;
use std::path::{Path, PathBuf};

use crate::config::{AssetMode, StandaloneConfig};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::renderer::PageRenderer;
use crate::standalone::{create_standalone_html, SavedPage, StandaloneError};
use crate::utils::default_output_path;

/// Render `url`, make it standalone and write it to `output`
///
/// Without `output` the file goes to the current directory under
/// `<host>_<timestamp>_standalone.html`. Resources are fetched over HTTP
/// with the identity, timeout and size limit from `config`.
pub async fn url_to_standalone_html<R: PageRenderer>(
    url: &str,
    output: Option<&Path>,
    config: &StandaloneConfig,
    renderer: &R,
) -> Result<SavedPage, StandaloneError> {
    let fetcher = HttpFetcher::from_config(config)
        .map_err(|e| StandaloneError::ClientUnavailable(e.to_string()))?;
    snapshot_with_fetcher(url, output, config, renderer, &fetcher).await
}

/// [`url_to_standalone_html`] with a caller-provided fetcher
pub async fn snapshot_with_fetcher<R: PageRenderer, F: Fetcher>(
    url: &str,
    output: Option<&Path>,
    config: &StandaloneConfig,
    renderer: &R,
    fetcher: &F,
) -> Result<SavedPage, StandaloneError> {
    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(url, Local::now()).map_err(|e| StandaloneError::PageLoad {
            url: url.to_string(),
            reason: format!("{e:#}"),
        })?,
    };

    log::info!("Loading page: {url}");
    let page = renderer.render(url).await?;
    log::info!("Page loaded ({} bytes) from {}", page.html.len(), page.final_url);

    let result = create_standalone_html(&page.html, &page.final_url, config, fetcher).await?;

    write_output(&output_path, &result.html).await?;
    log::info!(
        "Saved {} ({} -> {} bytes)",
        output_path.display(),
        result.stats.total_size_before,
        result.stats.total_size_after
    );

    Ok(SavedPage {
        success: true,
        output_path,
        assets_dir: match config.asset_mode() {
            AssetMode::Download => config.assets_dir().map(Path::to_path_buf),
            AssetMode::Embed | AssetMode::Hotlink => None,
        },
        stats: result.stats,
        errors: result.errors,
    })
}

async fn write_output(path: &Path, html: &str) -> Result<(), StandaloneError> {
    let persist_err = |source: std::io::Error| StandaloneError::Persist {
        path: PathBuf::from(path),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(persist_err)?;
    }
    tokio::fs::write(path, html).await.map_err(persist_err)
}
