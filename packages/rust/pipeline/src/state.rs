//! Persisted pipeline state.
//!
//! One JSON file per project directory; saved after every mutation and
//! reloaded on open, so an interrupted run resumes where it stopped.
//! A corrupt or unreadable file degrades to a fresh initial state rather
//! than failing closed.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use siteforge_shared::{CheckpointPassed, Result, RunId, SiteForgeError, StageName};

/// File name of the persisted state within a project directory.
pub const STATE_FILE_NAME: &str = "pipeline_state.json";

/// One applied modification set, recorded in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModificationRecord {
    pub timestamp: DateTime<Utc>,
    pub modifications: BTreeMap<String, Value>,
}

/// The full persisted state of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    pub project_name: String,
    pub run_id: RunId,
    /// Index into the fixed stage order; equal to the stage count once
    /// the pipeline is complete.
    pub current_stage: usize,
    /// Redundant human-readable label, derived on save.
    pub current_stage_name: String,
    #[serde(default)]
    pub stage_outputs: BTreeMap<String, Value>,
    #[serde(default)]
    pub user_modifications: BTreeMap<String, Vec<ModificationRecord>>,
    #[serde(default)]
    pub checkpoints_passed: Vec<CheckpointPassed>,
    /// Time of the last save.
    pub timestamp: DateTime<Utc>,
}

impl PipelineState {
    /// Fresh initial state: first stage, nothing stored.
    pub fn new(project_name: &str) -> Self {
        Self {
            project_name: project_name.to_string(),
            run_id: RunId::new(),
            current_stage: 0,
            current_stage_name: stage_label(0),
            stage_outputs: BTreeMap::new(),
            user_modifications: BTreeMap::new(),
            checkpoints_passed: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// The current stage's label, or `"complete"` past the final stage.
    pub fn current_stage_label(&self) -> String {
        stage_label(self.current_stage)
    }

    /// Persist to `path`, refreshing the derived fields.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.current_stage_name = self.current_stage_label();
        self.timestamp = Utc::now();

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SiteForgeError::State(format!("serialize state: {e}")))?;
        std::fs::write(path, json).map_err(|e| SiteForgeError::io(path, e))?;

        info!(project = %self.project_name, stage = %self.current_stage_name, "pipeline state saved");
        Ok(())
    }

    /// Load from `path`, falling back to a fresh state when the file is
    /// missing, unreadable, or corrupt.
    pub fn load_or_new(project_name: &str, path: &Path) -> Self {
        if !path.exists() {
            return Self::new(project_name);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                error!(?path, error = %e, "state file unreadable, starting fresh");
                return Self::new(project_name);
            }
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(state) => {
                info!(
                    project = %state.project_name,
                    stage = %state.current_stage_label(),
                    "pipeline state loaded"
                );
                state
            }
            Err(e) => {
                error!(?path, error = %e, "state file corrupt, starting fresh");
                Self::new(project_name)
            }
        }
    }
}

fn stage_label(index: usize) -> String {
    match StageName::at(index) {
        Some(stage) => stage.as_str().to_string(),
        None => "complete".to_string(),
    }
}
