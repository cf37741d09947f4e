//! Locating, downloading and launching Chromium

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// Flags that hide automation markers and keep popups, prompts and
/// background throttling from interfering with the capture
const LAUNCH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-notifications",
    "--disable-popup-blocking",
    "--disable-extensions",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
    "--disable-features=TranslateUI",
    "--disable-hang-monitor",
    "--disable-prompt-on-repost",
    "--disable-setuid-sandbox",
    "--no-sandbox",
    "--no-first-run",
    "--no-default-browser-check",
    "--ignore-certificate-errors",
    "--password-store=basic",
    "--use-mock-keychain",
    "--hide-scrollbars",
    "--mute-audio",
];

/// Executables probed with `which` on Unix
const PATH_COMMANDS: [&str; 4] = ["chromium", "chromium-browser", "google-chrome", "chrome"];

/// Browser launch parameters
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub user_agent: String,
    pub viewport: (u32, u32),
    pub request_timeout: Duration,
}

fn install_locations() -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
        .iter()
        .map(PathBuf::from)
        .collect()
    } else if cfg!(target_os = "macos") {
        let mut paths: Vec<PathBuf> = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join("Applications/Google Chrome.app/Contents/MacOS/Google Chrome"));
            paths.push(home.join("Applications/Chromium.app/Contents/MacOS/Chromium"));
        }
        paths
    } else {
        [
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
        .iter()
        .map(PathBuf::from)
        .collect()
    }
}

fn which(command: &str) -> Option<PathBuf> {
    let output = Command::new("which").arg(command).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!found.is_empty()).then(|| PathBuf::from(found))
}

/// Find an installed Chrome or Chromium
///
/// `CHROMIUM_PATH` wins when it points at an existing file, then the usual
/// install locations, then `$PATH`.
pub async fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(configured) = std::env::var("CHROMIUM_PATH") {
        let configured = PathBuf::from(configured);
        if configured.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", configured.display());
            return Ok(configured);
        }
        warn!(
            "CHROMIUM_PATH points to a missing file, ignoring it: {}",
            configured.display()
        );
    }

    if let Some(installed) = install_locations().into_iter().find(|p| p.exists()) {
        info!("Found browser at: {}", installed.display());
        return Ok(installed);
    }

    if !cfg!(target_os = "windows")
        && let Some(on_path) = PATH_COMMANDS.iter().find_map(|cmd| which(cmd))
    {
        info!("Found browser on PATH: {}", on_path.display());
        return Ok(on_path);
    }

    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Fetch a managed Chromium build into the user cache directory
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_root = dirs::cache_dir().unwrap_or_else(|| {
        let fallback = std::env::temp_dir();
        warn!("No user cache directory, falling back to {}", fallback.display());
        fallback
    });
    let install_dir = cache_root.join("kodegen-standalone").join("chromium");

    tokio::fs::create_dir_all(&install_dir)
        .await
        .with_context(|| format!("Failed to create {}", install_dir.display()))?;

    info!("Downloading Chromium into {}", install_dir.display());
    let options = BrowserFetcherOptions::builder()
        .with_path(&install_dir)
        .build()
        .context("Failed to build fetcher options")?;
    let revision = BrowserFetcher::new(options)
        .fetch()
        .await
        .context("Failed to download Chromium")?;

    info!("Chromium ready at {}", revision.executable_path.display());
    Ok(revision.executable_path)
}

/// Launch a browser for one capture
///
/// Returns the browser, its CDP event loop task and the throwaway profile
/// directory, which the caller removes after closing the browser.
pub async fn launch_browser(options: &LaunchOptions) -> Result<(Browser, JoinHandle<()>, PathBuf)> {
    let executable = match find_browser_executable().await {
        Ok(path) => path,
        Err(e) => {
            warn!("{e}, downloading a managed build");
            download_managed_browser().await?
        }
    };

    let profile_dir =
        std::env::temp_dir().join(format!("kodegen_standalone_profile_{}", std::process::id()));
    tokio::fs::create_dir_all(&profile_dir)
        .await
        .context("Failed to create browser profile directory")?;

    let (width, height) = options.viewport;
    let mut builder = BrowserConfigBuilder::default()
        .chrome_executable(executable)
        .user_data_dir(profile_dir.clone())
        .window_size(width, height)
        .request_timeout(options.request_timeout)
        .arg(format!("--user-agent={}", options.user_agent));
    builder = if options.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };
    for arg in LAUNCH_ARGS {
        builder = builder.arg(*arg);
    }

    let config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Invalid browser config: {e}"))?;

    debug!("Launching browser ({}x{}, headless: {})", width, height, options.headless);
    let (browser, mut handler) = Browser::launch(config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            let Err(e) = event else { continue };
            let message = e.to_string();
            // CDP events chromiumoxide has no type for
            if message.contains("data did not match any variant of untagged enum Message")
                || message.contains("Failed to deserialize WS response")
            {
                trace!("Ignoring unknown CDP message: {}", message);
            } else {
                error!("Browser handler error: {:?}", e);
            }
        }
        debug!("Browser handler finished");
    });

    Ok((browser, handler_task, profile_dir))
}
