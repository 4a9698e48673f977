use thiserror::Error;

use super::orchestrator::OrchestratorError;

/// Top-level error type for binary consumers of the core.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("orchestration failed: {0}")]
    Orchestrator(#[from] OrchestratorError),
    #[error("config error: {0}")]
    Config(String),
    #[error("patient record error: {0}")]
    PatientRecord(String),
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}
