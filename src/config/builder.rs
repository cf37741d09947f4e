//! Fluent builder for `StandaloneConfig`
//!
//! Every field has a default, so the builder is usable as-is; `build()`
//! checks the combinations that only make sense together (download mode
//! needs an asset folder, the worker pool needs at least one worker).

use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;
use std::time::Duration;

use super::types::{AssetMode, StandaloneConfig};
use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_RESOURCE_BYTES, DEFAULT_MAX_WORKERS,
    DEFAULT_PROJECT_NAME, PAGE_LOAD_TIMEOUT,
};

pub struct StandaloneConfigBuilder {
    pub(crate) asset_mode: AssetMode,
    pub(crate) assets_dir: Option<PathBuf>,
    pub(crate) assets_href: Option<String>,
    pub(crate) project_name: String,
    pub(crate) include_watermark: bool,
    pub(crate) remove_scripts: bool,
    pub(crate) max_workers: usize,
    pub(crate) fetch_timeout: Duration,
    pub(crate) max_resource_bytes: usize,
    pub(crate) cache_resources: bool,
    pub(crate) user_agent: String,
    pub(crate) close_cookie_banner: bool,
    pub(crate) headless: bool,
    pub(crate) page_load_timeout: Duration,
}

impl Default for StandaloneConfigBuilder {
    fn default() -> Self {
        Self {
            asset_mode: AssetMode::Embed,
            assets_dir: None,
            assets_href: None,
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            include_watermark: false,
            remove_scripts: true,
            max_workers: DEFAULT_MAX_WORKERS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_resource_bytes: DEFAULT_MAX_RESOURCE_BYTES,
            cache_resources: true,
            user_agent: CHROME_USER_AGENT.to_string(),
            close_cookie_banner: true,
            headless: true,
            page_load_timeout: PAGE_LOAD_TIMEOUT,
        }
    }
}

impl StandaloneConfig {
    /// Create a builder for configuring a `StandaloneConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> StandaloneConfigBuilder {
        StandaloneConfigBuilder::default()
    }
}

impl Default for StandaloneConfig {
    fn default() -> Self {
        let b = StandaloneConfigBuilder::default();
        Self {
            asset_mode: b.asset_mode,
            assets_dir: b.assets_dir,
            assets_href: b.assets_href,
            project_name: b.project_name,
            include_watermark: b.include_watermark,
            remove_scripts: b.remove_scripts,
            max_workers: b.max_workers,
            fetch_timeout: b.fetch_timeout,
            max_resource_bytes: b.max_resource_bytes,
            cache_resources: b.cache_resources,
            user_agent: b.user_agent,
            close_cookie_banner: b.close_cookie_banner,
            headless: b.headless,
            page_load_timeout: b.page_load_timeout,
        }
    }
}

impl StandaloneConfigBuilder {
    #[must_use]
    pub fn asset_mode(mut self, mode: AssetMode) -> Self {
        self.asset_mode = mode;
        self
    }

    /// Set the asset folder for download mode
    ///
    /// `dir` is where files are written; `href` is the prefix written into
    /// the document (for example the folder name relative to the output file).
    ///
    /// # Example
    /// ```rust
    /// # use kodegen_tools_standalone::config::{AssetMode, StandaloneConfig};
    /// # fn main() -> anyhow::Result<()> {
    /// let config = StandaloneConfig::builder()
    ///     .asset_mode(AssetMode::Download)
    ///     .assets_folder("./out/page_assets", "page_assets")
    ///     .build()?;
    /// assert_eq!(config.assets_href(), Some("page_assets"));
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn assets_folder(mut self, dir: impl Into<PathBuf>, href: impl Into<String>) -> Self {
        self.assets_dir = Some(dir.into());
        self.assets_href = Some(href.into());
        self
    }

    #[must_use]
    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    #[must_use]
    pub fn include_watermark(mut self, include: bool) -> Self {
        self.include_watermark = include;
        self
    }

    #[must_use]
    pub fn remove_scripts(mut self, remove: bool) -> Self {
        self.remove_scripts = remove;
        self
    }

    #[must_use]
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    #[must_use]
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn max_resource_bytes(mut self, bytes: usize) -> Self {
        self.max_resource_bytes = bytes;
        self
    }

    /// Enable or disable the per-conversion resolution cache (default: enabled)
    #[must_use]
    pub fn cache_resources(mut self, enabled: bool) -> Self {
        self.cache_resources = enabled;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn close_cookie_banner(mut self, close: bool) -> Self {
        self.close_cookie_banner = close;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<StandaloneConfig> {
        if self.max_workers == 0 {
            bail!("max_workers must be at least 1");
        }
        if self.fetch_timeout.is_zero() {
            bail!("fetch_timeout must be greater than zero");
        }

        let (assets_dir, assets_href) = if self.asset_mode == AssetMode::Download {
            let dir = self
                .assets_dir
                .ok_or_else(|| anyhow!("assets folder is required in download mode"))?;
            let href = self
                .assets_href
                .map(|h| h.trim_end_matches('/').to_string())
                .filter(|h| !h.is_empty())
                .ok_or_else(|| anyhow!("assets href prefix must not be empty"))?;
            (Some(dir), Some(href))
        } else {
            (self.assets_dir, self.assets_href)
        };

        Ok(StandaloneConfig {
            asset_mode: self.asset_mode,
            assets_dir,
            assets_href,
            project_name: self.project_name,
            include_watermark: self.include_watermark,
            remove_scripts: self.remove_scripts,
            max_workers: self.max_workers,
            fetch_timeout: self.fetch_timeout,
            max_resource_bytes: self.max_resource_bytes,
            cache_resources: self.cache_resources,
            user_agent: self.user_agent,
            close_cookie_banner: self.close_cookie_banner,
            headless: self.headless,
            page_load_timeout: self.page_load_timeout,
        })
    }
}
