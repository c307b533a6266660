//! The SiteForge stage pipeline: a persisted, resumable state machine
//! that sequences named stages, gates progress behind validation
//! checkpoints, and allows out-of-band modification of stage results.

pub mod checkpoint;
pub mod modify;
pub mod pipeline;
pub mod stage;
pub mod state;
pub mod validators;

pub use checkpoint::summarize;
pub use modify::set_by_path;
pub use pipeline::{Pipeline, PipelineStatus};
pub use stage::{Stage, StageContext, StageRegistry};
pub use state::{ModificationRecord, PipelineState, STATE_FILE_NAME};
pub use validators::{Validator, validator_for};
