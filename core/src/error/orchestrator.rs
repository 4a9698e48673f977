use thiserror::Error;

use crate::prediction::TaskName;

/// Hard failures of the orchestration machinery itself.
///
/// These abort the whole invocation before the scatter begins and are a
/// different error class from a per-task rejection, which is captured into
/// the aggregate report and never propagated.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("drug selection is empty; the orchestrator must not be invoked without at least one selected drug")]
    EmptyDrugSelection,

    #[error("task set is empty")]
    EmptyTaskSet,

    #[error("duplicate task name in task set: {0}")]
    DuplicateTask(TaskName),
}

/// Opaque failure reason a prediction subsystem attaches to its task.
///
/// The orchestrator imposes no schema on subsystem failures beyond a reason
/// string attachable to a task name; backends with richer internals wrap
/// them through the `Internal` variant.
#[derive(Error, Debug)]
pub enum SubsystemError {
    #[error("{0}")]
    Unavailable(String),

    #[error("invalid prediction payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
