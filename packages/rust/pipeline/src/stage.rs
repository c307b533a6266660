//! The uniform contract every pipeline stage implements, and the registry
//! the pipeline dispatches through.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use siteforge_shared::{Result, StageName};

/// Execution context handed to a stage: where its artifacts belong.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// The project run directory; stages write artifacts into
    /// subdirectories of this path.
    pub project_dir: PathBuf,
}

/// One named unit of pipeline work.
///
/// Input and output are open, nested JSON structures; the schema is a
/// convention between adjacent stages, not enforced by the contract.
#[async_trait]
pub trait Stage: Send + Sync {
    /// The stage's position in the fixed pipeline order.
    fn name(&self) -> StageName;

    /// Run the stage against its input and produce its output.
    async fn run(&self, ctx: &StageContext, input: Value) -> Result<Value>;
}

/// Registered stage implementations, keyed by stage name.
#[derive(Default)]
pub struct StageRegistry {
    stages: HashMap<StageName, Box<dyn Stage>>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage implementation under its own name.
    pub fn register(&mut self, stage: Box<dyn Stage>) {
        self.stages.insert(stage.name(), stage);
    }

    /// Look up the implementation for a stage.
    pub fn get(&self, name: StageName) -> Option<&dyn Stage> {
        self.stages.get(&name).map(|s| s.as_ref())
    }
}
