//! Stage implementations for the SiteForge pipeline.
//!
//! The discovery stage wraps the Discovery Engine and service-taxonomy
//! classification; the four downstream stages (architecture planning,
//! content strategy, content generation, site emission) are deterministic
//! transformations of their predecessor's output.

use std::path::Path;

use serde::Serialize;

use siteforge_pipeline::StageRegistry;
use siteforge_shared::{DiscoveryConfig, Result, SiteForgeError};

pub mod discovery;
pub mod emission;
pub mod generation;
pub mod payload;
pub mod planning;
pub mod strategy;
pub mod taxonomy;

pub use discovery::DiscoveryStage;
pub use emission::SiteEmissionStage;
pub use generation::ContentGenerationStage;
pub use payload::StagePayload;
pub use planning::ArchitecturePlanningStage;
pub use strategy::ContentStrategyStage;

/// A registry with all five built-in stages wired in pipeline order.
pub fn default_registry(config: &DiscoveryConfig) -> StageRegistry {
    let mut registry = StageRegistry::new();
    registry.register(Box::new(DiscoveryStage::new(config.clone())));
    registry.register(Box::new(ArchitecturePlanningStage));
    registry.register(Box::new(ContentStrategyStage));
    registry.register(Box::new(ContentGenerationStage));
    registry.register(Box::new(SiteEmissionStage));
    registry
}

/// Write a pretty-printed JSON artifact into a stage's output directory,
/// creating the directory if needed.
pub(crate) fn write_json_artifact(
    dir: &Path,
    file_name: &str,
    value: &impl Serialize,
) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| SiteForgeError::io(dir, e))?;
    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| SiteForgeError::State(format!("serialize artifact: {e}")))?;
    std::fs::write(&path, json).map_err(|e| SiteForgeError::io(&path, e))?;
    Ok(())
}
