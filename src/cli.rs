//! Command-line arguments for `kodegen-standalone`

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use kodegen_tools_standalone::utils::{DEFAULT_MAX_WORKERS, DEFAULT_PROJECT_NAME};
use kodegen_tools_standalone::{AssetMode, StandaloneConfig};

/// Save a web page as a single HTML file that works offline
#[derive(Debug, Parser)]
#[command(name = "kodegen-standalone", version, about)]
pub struct Cli {
    /// Page to capture
    pub url: String,

    /// Output file (default: <host>_<timestamp>_standalone.html)
    pub output: Option<PathBuf>,

    /// Project name shown in the watermark and metadata comment
    #[arg(short = 'p', long, default_value = DEFAULT_PROJECT_NAME)]
    pub project_name: String,

    /// Add a preview watermark banner
    #[arg(short = 'w', long)]
    pub watermark: bool,

    /// Keep <script> elements
    #[arg(long)]
    pub keep_scripts: bool,

    /// Do not click or remove cookie banners
    #[arg(long)]
    pub no_cookie_close: bool,

    /// How resources are handled
    #[arg(short = 'a', long, value_enum, default_value_t = AssetMode::Embed)]
    pub assets_mode: AssetMode,

    /// Concurrent stylesheet downloads
    #[arg(long, default_value_t = DEFAULT_MAX_WORKERS)]
    pub max_workers: usize,

    /// Per-resource timeout in seconds
    #[arg(long, default_value_t = 15)]
    pub fetch_timeout: u64,

    /// Fetch repeated resource URLs again instead of reusing the first result
    #[arg(long)]
    pub no_resource_cache: bool,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Build the conversion config for an already resolved output path
    pub fn to_config(&self, output: &std::path::Path) -> Result<StandaloneConfig> {
        let mut builder = StandaloneConfig::builder()
            .asset_mode(self.assets_mode)
            .project_name(self.project_name.clone())
            .include_watermark(self.watermark)
            .remove_scripts(!self.keep_scripts)
            .close_cookie_banner(!self.no_cookie_close)
            .max_workers(self.max_workers)
            .fetch_timeout(Duration::from_secs(self.fetch_timeout))
            .cache_resources(!self.no_resource_cache)
            .headless(!self.headful);

        if self.assets_mode == AssetMode::Download {
            let (dir, href) = kodegen_tools_standalone::utils::assets_folder_for(output);
            builder = builder.assets_folder(dir, href);
        }

        builder.build()
    }
}
