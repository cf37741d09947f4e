//! Configuration module for standalone conversions
//!
//! This module provides the `StandaloneConfig` struct and its builder for
//! configuring a conversion with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::StandaloneConfigBuilder;
pub use types::{AssetMode, StandaloneConfig};
