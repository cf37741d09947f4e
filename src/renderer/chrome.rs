//! Chromium-backed renderer
//!
//! Loads the page, lets lazy content appear by scrolling through it, and
//! returns the live DOM serialized as HTML.

use anyhow::{Context, Result};
use chromiumoxide::Page;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::browser_setup::{launch_browser, LaunchOptions};
use super::{PageRenderer, RenderFuture, RenderedPage};
use crate::config::StandaloneConfig;
use crate::standalone::StandaloneError;
use crate::utils::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
const READY_MAX_WAIT: Duration = Duration::from_secs(10);
const COOKIE_CLICK_SETTLE: Duration = Duration::from_millis(800);
const SCROLL_STEP_DELAY: Duration = Duration::from_millis(300);
const SCROLL_TOP_SETTLE: Duration = Duration::from_millis(500);
/// Infinite-scroll pages keep growing
const MAX_SCROLL_STEPS: usize = 200;

const ACCEPT_COOKIES_SCRIPT: &str = r#"
(function() {
    const selectors = [
        '.brlbs-btn-accept-all',
        '.brlbs-cmpnt-btn-accept-all',
        '[data-borlabs-cookie-accept]',
        '[class*="cookie"] button[class*="accept"]',
        '#CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll',
        '#onetrust-accept-btn-handler',
        '.cc-accept-all',
        '.cmplz-accept',
        '#cookie-accept-all',
        '[data-testid="cookie-accept-all"]'
    ];
    const visible = el => !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);
    for (const sel of selectors) {
        const el = document.querySelector(sel);
        if (el && visible(el)) { el.click(); return true; }
    }
    const labels = ['alle akzeptieren', 'accept all', 'akzeptieren', 'alle cookies akzeptieren'];
    for (const button of document.querySelectorAll('button')) {
        const text = (button.innerText || '').trim().toLowerCase();
        if (labels.includes(text) && visible(button)) { button.click(); return true; }
    }
    return false;
})()
"#;

const REMOVE_COOKIE_BANNERS_SCRIPT: &str = r#"
(function() {
    const selectors = [
        '.brlbs-cmpnt-container',
        '#BorlabsCookieBox',
        '[class*="borlabs-cookie"]',
        '#CybotCookiebotDialog',
        '#CybotCookiebotDialogBodyUnderlay',
        '#onetrust-consent-sdk',
        '#onetrust-banner-sdk',
        '#cmplz-cookiebanner-container',
        '.cmplz-cookiebanner',
        '#cookie-notice',
        '#cookie-law-info-bar',
        '#moove_gdpr_cookie_modal',
        '#moove_gdpr_cookie_info_bar',
        '[class*="cookie-banner"]',
        '[class*="cookie-consent"]',
        '[id*="cookie-banner"]',
        '[id*="cookie-consent"]'
    ];
    let removed = 0;
    selectors.forEach(sel => {
        document.querySelectorAll(sel).forEach(el => { el.remove(); removed++; });
    });
    return removed;
})()
"#;

/// Renders pages in a freshly launched Chromium per call
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    headless: bool,
    close_cookie_banner: bool,
    page_load_timeout: Duration,
    user_agent: String,
    viewport: (u32, u32),
}

impl ChromeRenderer {
    #[must_use]
    pub fn from_config(config: &StandaloneConfig) -> Self {
        Self {
            headless: config.headless(),
            close_cookie_banner: config.close_cookie_banner(),
            page_load_timeout: config.page_load_timeout(),
            user_agent: config.user_agent().to_string(),
            viewport: (VIEWPORT_WIDTH, VIEWPORT_HEIGHT),
        }
    }

    async fn render_page(&self, url: &str) -> Result<RenderedPage, StandaloneError> {
        let options = LaunchOptions {
            headless: self.headless,
            user_agent: self.user_agent.clone(),
            viewport: self.viewport,
            request_timeout: self.page_load_timeout,
        };

        let (mut browser, handler_task, user_data_dir) = launch_browser(&options)
            .await
            .map_err(|e| StandaloneError::RendererUnavailable(format!("{e:#}")))?;

        let captured = match browser.new_page("about:blank").await {
            Ok(page) => self.capture(&page, url).await,
            Err(e) => Err(anyhow::anyhow!("Failed to open page: {e}")),
        };

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = browser.wait().await {
            debug!("Browser process wait failed: {}", e);
        }
        handler_task.abort();
        if let Err(e) = tokio::fs::remove_dir_all(&user_data_dir).await {
            debug!(
                "Failed to remove browser profile {}: {}",
                user_data_dir.display(),
                e
            );
        }

        captured.map_err(|e| StandaloneError::PageLoad {
            url: url.to_string(),
            reason: format!("{e:#}"),
        })
    }

    async fn capture(&self, page: &Page, url: &str) -> Result<RenderedPage> {
        let timeout = self.page_load_timeout;

        info!("Navigating to {}", url);
        with_page_timeout(
            async { page.goto(url).await.map(|_| ()).context("Navigation failed") },
            timeout,
            "Navigation",
        )
        .await?;
        with_page_timeout(
            async {
                page.wait_for_navigation()
                    .await
                    .map(|_| ())
                    .context("Waiting for navigation failed")
            },
            timeout,
            "Page load",
        )
        .await?;
        wait_for_ready_state(page).await;

        if self.close_cookie_banner {
            accept_cookies(page).await;
        }

        scroll_through(page, self.viewport.1).await;

        if self.close_cookie_banner {
            match page.evaluate(REMOVE_COOKIE_BANNERS_SCRIPT).await {
                Ok(result) => {
                    let removed = result.into_value::<u64>().unwrap_or(0);
                    debug!("Removed {} cookie banner elements", removed);
                }
                Err(e) => warn!("Cookie banner removal failed: {}", e),
            }
        }

        let html = page.content().await.context("Failed to read page content")?;
        let final_url = match page.url().await {
            Ok(Some(current)) => current,
            Ok(None) => url.to_string(),
            Err(e) => {
                warn!("Failed to get page URL, using requested URL: {}", e);
                url.to_string()
            }
        };

        if let Err(e) = page.clone().close().await {
            debug!("Failed to close page: {}", e);
        }

        info!("Rendered {} ({} bytes)", final_url, html.len());
        Ok(RenderedPage { html, final_url })
    }
}

impl PageRenderer for ChromeRenderer {
    fn render<'a>(&'a self, url: &'a str) -> RenderFuture<'a> {
        Box::pin(self.render_page(url))
    }
}

async fn with_page_timeout<F, T>(operation: F, timeout: Duration, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timeout after {} seconds",
            timeout.as_secs()
        )),
    }
}

/// Poll `document.readyState` until the page reports complete
async fn wait_for_ready_state(page: &Page) {
    let start = Instant::now();
    loop {
        if start.elapsed() >= READY_MAX_WAIT {
            warn!(
                "Timeout waiting for page load after {}s, proceeding anyway",
                READY_MAX_WAIT.as_secs()
            );
            return;
        }

        if let Ok(result) = page.evaluate("document.readyState").await
            && let Ok(state) = result.into_value::<String>()
            && state == "complete"
        {
            debug!("Page ready after {:.2}s", start.elapsed().as_secs_f64());
            return;
        }

        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}

async fn accept_cookies(page: &Page) {
    match page.evaluate(ACCEPT_COOKIES_SCRIPT).await {
        Ok(result) => {
            if result.into_value::<bool>().unwrap_or(false) {
                debug!("Clicked cookie consent button");
                tokio::time::sleep(COOKIE_CLICK_SETTLE).await;
            } else {
                debug!("No cookie consent button found");
            }
        }
        Err(e) => warn!("Cookie consent click failed: {}", e),
    }
}

async fn scroll_height(page: &Page) -> f64 {
    match page.evaluate("document.body ? document.body.scrollHeight : 0").await {
        Ok(result) => result.into_value::<f64>().unwrap_or(0.0),
        Err(e) => {
            debug!("Failed to read scroll height: {}", e);
            0.0
        }
    }
}

/// Scroll down one viewport at a time so lazy loaders fire, then back to the top
async fn scroll_through(page: &Page, viewport_height: u32) {
    let step = f64::from(viewport_height);
    let mut height = scroll_height(page).await;
    let mut position = 0.0;
    let mut steps = 0;

    while position < height && steps < MAX_SCROLL_STEPS {
        position += step;
        steps += 1;
        if let Err(e) = page.evaluate(format!("window.scrollTo(0, {position})")).await {
            warn!("Scrolling failed at {}px: {}", position, e);
            break;
        }
        tokio::time::sleep(SCROLL_STEP_DELAY).await;
        // Height grows as lazy content arrives
        height = scroll_height(page).await;
    }
    debug!("Scrolled {} steps through {}px", steps, height);

    if let Err(e) = page.evaluate("window.scrollTo(0, 0)").await {
        warn!("Failed to scroll back to top: {}", e);
    }
    tokio::time::sleep(SCROLL_TOP_SETTLE).await;
}
