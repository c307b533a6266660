//! The pipeline state machine.
//!
//! Sequences the fixed stage order, persists progress after every
//! mutation, and gates advancement behind explicit checkpoints. One
//! writer per project directory is assumed; concurrent pipelines against
//! the same project are not supported.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use siteforge_shared::{
    CheckpointPassed, CheckpointReport, Result, SiteForgeError, StageName,
};

use crate::checkpoint;
use crate::modify::set_by_path;
use crate::stage::{StageContext, StageRegistry};
use crate::state::{ModificationRecord, PipelineState, STATE_FILE_NAME};
use crate::validators::{self, Validator};

/// A resumable, checkpointed pipeline run over one project directory.
pub struct Pipeline {
    project_dir: PathBuf,
    state: PipelineState,
    registry: StageRegistry,
}

/// Read-only projection of the pipeline state for external display.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub project_name: String,
    pub current_stage: String,
    pub current_stage_index: usize,
    pub total_stages: usize,
    pub completed_stages: Vec<String>,
    pub checkpoints_passed: usize,
    pub has_modifications: bool,
    pub project_directory: String,
}

impl Pipeline {
    /// Open (or create) the pipeline for a project.
    ///
    /// Materializes the project directory and resumes from its persisted
    /// state when present.
    pub fn open(project_name: &str, output_dir: &Path, registry: StageRegistry) -> Result<Self> {
        let project_dir = output_dir.join(project_name);
        std::fs::create_dir_all(&project_dir)
            .map_err(|e| SiteForgeError::io(&project_dir, e))?;

        let state = PipelineState::load_or_new(project_name, &project_dir.join(STATE_FILE_NAME));

        Ok(Self {
            project_dir,
            state,
            registry,
        })
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// The current stage, or `None` once the pipeline is complete.
    pub fn current_stage(&self) -> Option<StageName> {
        StageName::at(self.state.current_stage)
    }

    fn save(&mut self) -> Result<()> {
        let path = self.project_dir.join(STATE_FILE_NAME);
        self.state.save(&path)
    }

    /// Run a stage and store its output under the stage name.
    ///
    /// With no input supplied and the pipeline past the first stage, the
    /// input defaults to the preceding stage's stored output (chaining).
    /// Running a stage does not advance the current-stage index.
    #[instrument(skip(self, input), fields(stage = %name, project = %self.state.project_name))]
    pub async fn run_stage(&mut self, name: StageName, input: Option<Value>) -> Result<Value> {
        let input = match input {
            Some(value) => value,
            None => self.default_input(),
        };

        let stage = self.registry.get(name).ok_or_else(|| {
            SiteForgeError::UnknownStage(format!("{name} (no implementation registered)"))
        })?;

        info!("running stage");
        let ctx = StageContext {
            project_dir: self.project_dir.clone(),
        };
        let output = stage.run(&ctx, input).await?;

        self.state
            .stage_outputs
            .insert(name.as_str().to_string(), output.clone());
        self.save()?;

        Ok(output)
    }

    /// The chained default input: the stored output of the stage before
    /// the current index, or an empty object at the start of the run.
    fn default_input(&self) -> Value {
        if self.state.current_stage == 0 {
            return json!({});
        }
        StageName::at(self.state.current_stage - 1)
            .and_then(|prev| self.state.stage_outputs.get(prev.as_str()).cloned())
            .unwrap_or_else(|| json!({}))
    }

    /// Evaluate a checkpoint for a stage and persist its report.
    ///
    /// Any error reported by the validator blocks advancement, regardless
    /// of the validator's own `passed` claim.
    pub fn checkpoint(
        &self,
        name: StageName,
        validator: Option<Validator>,
    ) -> Result<CheckpointReport> {
        let output = self
            .state
            .stage_outputs
            .get(name.as_str())
            .cloned()
            .unwrap_or_else(|| json!({}));

        let validation = validator.unwrap_or(validators::always_pass)(&output);
        let summary = checkpoint::summarize(name, &output);
        let next_stage = StageName::at(self.state.current_stage + 1);
        let report = CheckpointReport::new(name, validation, summary, next_stage);

        let path = self
            .project_dir
            .join(format!("checkpoint_{}.json", name.as_str()));
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| SiteForgeError::State(format!("serialize checkpoint: {e}")))?;
        std::fs::write(&path, json).map_err(|e| SiteForgeError::io(&path, e))?;

        info!(
            stage = %name,
            passed = report.validation_results.passed,
            warnings = report.validation_results.warnings.len(),
            errors = report.validation_results.errors.len(),
            can_proceed = report.can_proceed,
            "checkpoint evaluated"
        );

        Ok(report)
    }

    /// Record and apply a set of dotted-path modifications to a stage's
    /// stored output.
    pub fn apply_user_modifications(
        &mut self,
        name: StageName,
        modifications: BTreeMap<String, Value>,
    ) -> Result<()> {
        info!(stage = %name, count = modifications.len(), "applying user modifications");

        self.state
            .user_modifications
            .entry(name.as_str().to_string())
            .or_default()
            .push(ModificationRecord {
                timestamp: Utc::now(),
                modifications: modifications.clone(),
            });

        if let Some(output) = self.state.stage_outputs.get_mut(name.as_str()) {
            for (path, value) in &modifications {
                set_by_path(output, path, value.clone())?;
            }
        }

        self.save()
    }

    /// Advance past the current stage, recording its checkpoint as passed.
    ///
    /// Returns whether a further stage remains; a no-op returning `false`
    /// once the pipeline is complete.
    pub fn proceed_to_next_stage(&mut self) -> Result<bool> {
        let Some(current) = self.current_stage() else {
            info!("pipeline already complete");
            return Ok(false);
        };

        self.state.checkpoints_passed.push(CheckpointPassed {
            stage: current.as_str().to_string(),
            timestamp: Utc::now(),
        });
        self.state.current_stage += 1;
        self.save()?;

        match self.current_stage() {
            Some(next) => {
                info!(stage = %next, "proceeding to next stage");
                Ok(true)
            }
            None => {
                info!("pipeline complete");
                Ok(false)
            }
        }
    }

    /// Reset the current index to a stage's position. Stored outputs for
    /// later stages remain addressable but are no longer "current".
    pub fn restart_from_stage(&mut self, name: StageName) -> Result<()> {
        self.state.current_stage = name.index();
        self.save()?;
        info!(stage = %name, "pipeline restarted from stage");
        Ok(())
    }

    /// Read-only status projection.
    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            project_name: self.state.project_name.clone(),
            current_stage: self.state.current_stage_label(),
            current_stage_index: self.state.current_stage,
            total_stages: StageName::ALL.len(),
            completed_stages: self.state.stage_outputs.keys().cloned().collect(),
            checkpoints_passed: self.state.checkpoints_passed.len(),
            has_modifications: !self.state.user_modifications.is_empty(),
            project_directory: self.project_dir.display().to_string(),
        }
    }

    /// Human-readable progress report.
    pub fn progress_report(&self) -> String {
        let status = self.status();
        let mut report = Vec::new();

        report.push("=".repeat(60));
        report.push(format!("Pipeline Progress Report: {}", status.project_name));
        report.push("=".repeat(60));
        report.push(format!(
            "Current Stage: {} ({}/{})",
            status.current_stage,
            (status.current_stage_index + 1).min(status.total_stages),
            status.total_stages
        ));
        report.push(String::new());

        report.push("Stages Progress:".to_string());
        for (i, stage) in StageName::ALL.iter().enumerate() {
            let icon = if status.completed_stages.contains(&stage.as_str().to_string()) {
                "✓"
            } else if i == status.current_stage_index {
                "→"
            } else {
                "○"
            };
            report.push(format!("  {icon} {stage}"));
        }

        report.push(String::new());
        report.push(format!("Checkpoints Passed: {}", status.checkpoints_passed));
        report.push(format!(
            "User Modifications: {}",
            if status.has_modifications { "Yes" } else { "No" }
        ));
        report.push(format!("Project Directory: {}", status.project_directory));

        report.join("\n")
    }
}
