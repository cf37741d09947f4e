//! Getter methods for `StandaloneConfig`

use std::path::Path;
use std::time::Duration;

use super::types::{AssetMode, StandaloneConfig};

impl StandaloneConfig {
    #[must_use]
    pub fn asset_mode(&self) -> AssetMode {
        self.asset_mode
    }

    #[must_use]
    pub fn assets_dir(&self) -> Option<&Path> {
        self.assets_dir.as_deref()
    }

    #[must_use]
    pub fn assets_href(&self) -> Option<&str> {
        self.assets_href.as_deref()
    }

    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    #[must_use]
    pub fn include_watermark(&self) -> bool {
        self.include_watermark
    }

    #[must_use]
    pub fn remove_scripts(&self) -> bool {
        self.remove_scripts
    }

    #[must_use]
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    #[must_use]
    pub fn max_resource_bytes(&self) -> usize {
        self.max_resource_bytes
    }

    #[must_use]
    pub fn cache_resources(&self) -> bool {
        self.cache_resources
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn close_cookie_banner(&self) -> bool {
        self.close_cookie_banner
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn page_load_timeout(&self) -> Duration {
        self.page_load_timeout
    }
}
