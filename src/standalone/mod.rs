//! Standalone HTML conversion
//!
//! This module rewrites a rendered page so it no longer depends on the
//! network: stylesheets, images, responsive candidates and inline
//! backgrounds are either inlined as data URLs, saved next to the output,
//! or deliberately left pointing at their origin.

// Sub-modules
pub mod asset_store;
pub mod collector;
pub mod css;
pub mod orchestrator;
pub mod passes;
pub mod splice;
pub mod strategy;
pub mod types;

// Re-exports for public API
pub use asset_store::{AssetStore, AssetStoreError};
pub use collector::{Contribution, StatsCollector};
pub use css::{decode_stylesheet, inline_css_urls, CssInlineReport};
pub use orchestrator::{create_standalone_html, create_standalone_html_at};
pub use strategy::{ReferenceResolver, RewriteOutcome, RewriteStrategy};
pub use types::{
    ConversionResult, ConversionStats, ErrorRecord, ResourceCategory, ResourceReference,
    SavedPage, StandaloneError,
};
