use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::prediction::{
    AdverseEventPrediction, DiscoveryReport, MonitoringInsight, PredictionValue,
    ResponsePrediction, RweReport, TaskName,
};

/// Terminal state of one task. Never a bare value: consumers must handle all
/// three variants, which keeps "unavailable due to error" and "not
/// applicable because not requested" distinguishable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum TaskOutcome {
    Fulfilled { value: PredictionValue },
    Rejected { detail: RejectDetail },
    Skipped,
}

impl TaskOutcome {
    pub fn fulfilled(value: PredictionValue) -> Self {
        Self::Fulfilled { value }
    }

    pub fn rejected(detail: RejectDetail) -> Self {
        Self::Rejected { detail }
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Why a slot is unavailable. Timeouts and cancellations are synthesized
/// rejections and share the slot-level isolation of subsystem failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectDetail {
    pub kind: RejectKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectKind {
    Subsystem,
    Timeout,
    Cancelled,
}

impl RejectDetail {
    pub fn subsystem(message: impl Into<String>) -> Self {
        Self {
            kind: RejectKind::Subsystem,
            message: message.into(),
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            kind: RejectKind::Timeout,
            message: format!("timeout after {}ms", after.as_millis()),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            kind: RejectKind::Cancelled,
            message: "superseded by a newer invocation".to_string(),
        }
    }
}

/// State of one named report slot. Slots start `Pending` and move exactly
/// once to `Settled`; no further state change occurs after settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "slot", rename_all = "kebab-case")]
pub enum SlotState {
    Pending,
    Settled { outcome: TaskOutcome },
}

impl SlotState {
    pub fn outcome(&self) -> Option<&TaskOutcome> {
        match self {
            Self::Pending => None,
            Self::Settled { outcome } => Some(outcome),
        }
    }
}

/// Derived top-level status of an aggregate report.
///
/// `HardFailure` is reserved for errors of the orchestration machinery
/// itself; an individual task rejection never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    AllPending,
    PartiallyComplete,
    FullySettled,
    HardFailure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ReportSlot {
    task: TaskName,
    state: SlotState,
}

/// Aggregate of all task outcomes for one invocation, keyed by task name.
///
/// Created together with its snapshot and discarded on the next invocation;
/// no cross-invocation caching exists. Slot order is the fixed descriptor
/// order, independent of settlement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub invocation_id: Uuid,
    slots: Vec<ReportSlot>,
    status: ReportStatus,
    /// Machinery error message, present only for `HardFailure` reports.
    pub failure: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl AggregateReport {
    /// A fresh report with every named slot pending.
    pub fn pending(invocation_id: Uuid, tasks: &[TaskName]) -> Self {
        Self {
            invocation_id,
            slots: tasks
                .iter()
                .map(|&task| ReportSlot {
                    task,
                    state: SlotState::Pending,
                })
                .collect(),
            status: ReportStatus::AllPending,
            failure: None,
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    /// A report representing a failure of the orchestration machinery
    /// itself, for consumers that render errors in report form.
    pub fn hard_failure(invocation_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            invocation_id,
            slots: Vec::new(),
            status: ReportStatus::HardFailure,
            failure: Some(message.into()),
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    /// Settle one slot. Settling an unknown or already-settled slot is a
    /// no-op that returns `false`; outcomes are recorded exactly once.
    pub fn settle(&mut self, task: TaskName, outcome: TaskOutcome) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|s| s.task == task) else {
            tracing::warn!(task = %task, "settlement for task not present in report");
            return false;
        };
        if matches!(slot.state, SlotState::Settled { .. }) {
            tracing::warn!(task = %task, "duplicate settlement ignored");
            return false;
        }
        slot.state = SlotState::Settled { outcome };
        self.status = self.derive_status();
        true
    }

    pub fn status(&self) -> ReportStatus {
        self.status
    }

    fn derive_status(&self) -> ReportStatus {
        if self.status == ReportStatus::HardFailure {
            return ReportStatus::HardFailure;
        }
        let settled = self
            .slots
            .iter()
            .filter(|s| matches!(s.state, SlotState::Settled { .. }))
            .count();
        if settled == 0 {
            ReportStatus::AllPending
        } else if settled < self.slots.len() {
            ReportStatus::PartiallyComplete
        } else {
            ReportStatus::FullySettled
        }
    }

    pub fn slot(&self, task: TaskName) -> Option<&SlotState> {
        self.slots.iter().find(|s| s.task == task).map(|s| &s.state)
    }

    pub fn outcome(&self, task: TaskName) -> Option<&TaskOutcome> {
        self.slot(task).and_then(SlotState::outcome)
    }

    /// Slots in fixed descriptor order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskName, &SlotState)> {
        self.slots.iter().map(|s| (s.task, &s.state))
    }

    pub fn pending_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.state, SlotState::Pending))
            .count()
    }

    pub fn fulfilled_count(&self) -> usize {
        self.count_outcomes(TaskOutcome::is_fulfilled)
    }

    pub fn rejected_count(&self) -> usize {
        self.count_outcomes(TaskOutcome::is_rejected)
    }

    pub fn skipped_count(&self) -> usize {
        self.count_outcomes(|o| matches!(o, TaskOutcome::Skipped))
    }

    fn count_outcomes(&self, pred: impl Fn(&TaskOutcome) -> bool) -> usize {
        self.slots
            .iter()
            .filter_map(|s| s.state.outcome())
            .filter(|o| pred(o))
            .count()
    }

    fn fulfilled_value(&self, task: TaskName) -> Option<&PredictionValue> {
        match self.outcome(task)? {
            TaskOutcome::Fulfilled { value } => Some(value),
            _ => None,
        }
    }

    pub fn adverse_events(&self) -> Option<&[AdverseEventPrediction]> {
        match self.fulfilled_value(TaskName::AdverseEvents)? {
            PredictionValue::AdverseEvents(events) => Some(events),
            _ => None,
        }
    }

    pub fn treatment_response(&self) -> Option<&ResponsePrediction> {
        match self.fulfilled_value(TaskName::TreatmentResponse)? {
            PredictionValue::TreatmentResponse(response) => Some(response),
            _ => None,
        }
    }

    pub fn discovery(&self) -> Option<&DiscoveryReport> {
        match self.fulfilled_value(TaskName::CombinatorialDiscovery)? {
            PredictionValue::Discovery(report) => Some(report),
            _ => None,
        }
    }

    pub fn real_world_evidence(&self) -> Option<&RweReport> {
        match self.fulfilled_value(TaskName::RealWorldEvidence)? {
            PredictionValue::RealWorldEvidence(report) => Some(report),
            _ => None,
        }
    }

    pub fn monitoring(&self) -> Option<&MonitoringInsight> {
        match self.fulfilled_value(TaskName::RealTimeMonitoring)? {
            PredictionValue::Monitoring(insight) => Some(insight),
            _ => None,
        }
    }
}
