//! Page rendering collaborator
//!
//! The conversion pipeline works on already-rendered HTML. A [`PageRenderer`]
//! produces it: [`ChromeRenderer`] drives a real Chromium, tests plug in
//! fixed documents.

pub mod browser_setup;
pub mod chrome;

use std::future::Future;
use std::pin::Pin;

use crate::standalone::StandaloneError;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser, LaunchOptions};
pub use chrome::ChromeRenderer;

/// Rendered document and the URL the browser ended up on after redirects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub html: String,
    pub final_url: String,
}

pub type RenderFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RenderedPage, StandaloneError>> + Send + 'a>>;

/// Anything that can turn a URL into rendered HTML
pub trait PageRenderer: Send + Sync {
    fn render<'a>(&'a self, url: &'a str) -> RenderFuture<'a>;
}

impl<R: PageRenderer + ?Sized> PageRenderer for &R {
    fn render<'a>(&'a self, url: &'a str) -> RenderFuture<'a> {
        (**self).render(url)
    }
}
