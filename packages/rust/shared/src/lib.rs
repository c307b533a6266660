//! Shared types, error model, and configuration for SiteForge.
//!
//! This crate is the foundation depended on by all other SiteForge crates.
//! It provides:
//! - [`SiteForgeError`] — the unified error type
//! - Domain types ([`StageName`], [`CategorizedUrls`], [`PageContent`], [`RunId`])
//! - Configuration ([`AppConfig`], [`DiscoveryConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, DiscoveryConfig, DiscoverySettings, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{Result, SiteForgeError};
pub use types::{
    Category, CategorizedUrls, CheckpointPassed, CheckpointReport, PageContent, PageSection,
    RunId, StageName, ValidationResult,
};
