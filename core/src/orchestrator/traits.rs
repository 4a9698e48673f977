use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::report::{ReportStatus, TaskOutcome};
use crate::error::SubsystemError;
use crate::prediction::{PredictionValue, TaskName};
use crate::snapshot::ClinicalContextSnapshot;

/// Call contract of an external prediction subsystem.
///
/// Implementations are opaque to the orchestrator: a call either resolves
/// with its typed payload or rejects with a [`SubsystemError`]. No retry is
/// performed on its behalf, and its failure is isolated to its own slot.
#[async_trait]
pub trait PredictionSubsystem: Send + Sync {
    fn name(&self) -> TaskName;

    /// Skip predicate, evaluated before launch. When it returns `false` the
    /// task settles `Skipped` and the call below is never issued, so the
    /// subsystem is not charged network cost for inputs it cannot use.
    fn applies_to(&self, _snapshot: &ClinicalContextSnapshot) -> bool {
        true
    }

    async fn predict(
        &self,
        snapshot: Arc<ClinicalContextSnapshot>,
    ) -> Result<PredictionValue, SubsystemError>;
}

/// Incremental view of a running orchestration.
///
/// Events arrive as slots settle, carrying the running report status, so a
/// consumer can render partially-complete state before the join barrier
/// releases. Settlement order between tasks carries no meaning.
pub trait ReportObserver: Send + Sync {
    fn on_event(&self, event: &OrchestrationEvent);
}

#[derive(Debug, Clone)]
pub enum OrchestrationEvent {
    RunStarted {
        invocation_id: Uuid,
        total_tasks: usize,
    },
    TaskStarted {
        invocation_id: Uuid,
        task: TaskName,
    },
    TaskSkipped {
        invocation_id: Uuid,
        task: TaskName,
    },
    TaskSettled {
        invocation_id: Uuid,
        task: TaskName,
        outcome: TaskOutcome,
        duration_ms: u64,
        status: ReportStatus,
    },
    RunCompleted {
        invocation_id: Uuid,
        status: ReportStatus,
        fulfilled: usize,
        rejected: usize,
        skipped: usize,
        duration_ms: u64,
    },
}
