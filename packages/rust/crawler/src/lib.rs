//! Multi-source content discovery for SiteForge.
//!
//! The [`DiscoveryEngine`] aggregates candidate page URLs from five
//! independent, unreliable sources (sitemap XML, WordPress REST API, path
//! probing, navigation extraction, secondary service-page crawling),
//! deduplicates and categorizes them, and extracts bounded page content on
//! demand. Every source is fail-soft: a strategy that errors contributes
//! nothing instead of aborting the discovery.

pub mod categorize;
pub mod engine;
pub mod extract;
pub mod fetch;
pub mod strategies;

pub use categorize::UrlCategorizer;
pub use engine::DiscoveryEngine;
pub use extract::parse_content;
pub use fetch::{HttpFetcher, USER_AGENT};
