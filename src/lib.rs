pub mod config;
pub mod fetch;
pub mod mime;
pub mod renderer;
pub mod snapshot;
pub mod standalone;
pub mod utils;

pub use config::{AssetMode, StandaloneConfig, StandaloneConfigBuilder};
pub use fetch::{CachingFetcher, FetchError, FetchOutcome, FetchedResource, Fetcher, HttpFetcher};
pub use mime::{resolve_mime, to_data_url};
pub use renderer::{ChromeRenderer, PageRenderer, RenderedPage};
pub use snapshot::{snapshot_with_fetcher, url_to_standalone_html};
pub use standalone::{
    ConversionResult, ConversionStats, ErrorRecord, ResourceCategory, SavedPage, StandaloneError,
    create_standalone_html, create_standalone_html_at,
};
