//! The five independent discovery strategies.
//!
//! Each strategy is fail-soft: network errors, non-2xx statuses, and
//! malformed responses degrade to an empty contribution and are logged,
//! never propagated.

pub mod navigation;
pub mod probe;
pub mod services;
pub mod sitemap;
pub mod wordpress;
