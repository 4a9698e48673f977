//! Typed outputs of the five prediction subsystems.
//!
//! Each subsystem resolves with exactly one [`PredictionValue`] variant; the
//! variant-per-task design makes exhaustive handling of settled slots a
//! compile-time requirement for consumers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the fixed task descriptor set, unique within an invocation and
/// used as the aggregate report keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskName {
    AdverseEvents,
    TreatmentResponse,
    CombinatorialDiscovery,
    RealWorldEvidence,
    RealTimeMonitoring,
}

impl TaskName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdverseEvents => "adverse-events",
            Self::TreatmentResponse => "treatment-response",
            Self::CombinatorialDiscovery => "combinatorial-discovery",
            Self::RealWorldEvidence => "real-world-evidence",
            Self::RealTimeMonitoring => "real-time-monitoring",
        }
    }

    /// The full descriptor set in its fixed launch order.
    pub fn all() -> [TaskName; 5] {
        [
            Self::AdverseEvents,
            Self::TreatmentResponse,
            Self::CombinatorialDiscovery,
            Self::RealWorldEvidence,
            Self::RealTimeMonitoring,
        ]
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settled payload of a fulfilled task, tagged by subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum PredictionValue {
    AdverseEvents(Vec<AdverseEventPrediction>),
    TreatmentResponse(ResponsePrediction),
    Discovery(DiscoveryReport),
    RealWorldEvidence(RweReport),
    Monitoring(MonitoringInsight),
}

impl PredictionValue {
    /// The task a payload variant belongs to. A fulfilled outcome whose
    /// payload does not match its task name is demoted to a rejection by the
    /// orchestrator.
    pub fn task_name(&self) -> TaskName {
        match self {
            Self::AdverseEvents(_) => TaskName::AdverseEvents,
            Self::TreatmentResponse(_) => TaskName::TreatmentResponse,
            Self::Discovery(_) => TaskName::CombinatorialDiscovery,
            Self::RealWorldEvidence(_) => TaskName::RealWorldEvidence,
            Self::Monitoring(_) => TaskName::RealTimeMonitoring,
        }
    }
}

/// Severity grading for predicted adverse events (CTCAE-style buckets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    LifeThreatening,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdverseEventPrediction {
    pub event: String,
    /// Probability in [0, 1].
    pub probability: f64,
    pub severity: Severity,
    /// Biomarkers that contributed to the prediction.
    pub contributing_markers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePrediction {
    /// Probability of objective response in [0, 1].
    pub response_probability: f64,
    /// Model confidence in [0, 1].
    pub confidence: f64,
    pub expected_duration_weeks: Option<f64>,
    pub rationale: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub candidates: Vec<CombinationCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationCandidate {
    pub drugs: Vec<String>,
    /// Predicted synergy in [0, 1].
    pub synergy_score: f64,
    pub mechanism: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RweReport {
    /// Size of the matched real-world cohort.
    pub cohort_size: u32,
    /// Observed response rate in the cohort, in [0, 1].
    pub response_rate: f64,
    pub observed_patterns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymptomTrend {
    Improving,
    Stable,
    Worsening,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringInsight {
    pub alerts: Vec<String>,
    /// Treatment adherence estimate in [0, 1].
    pub adherence_score: f64,
    pub symptom_trend: SymptomTrend,
}
