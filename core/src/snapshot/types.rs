use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One immutable input payload shared read-only across all prediction tasks.
///
/// Captured once at invocation time; never mutated afterwards. Every task
/// reads the same snapshot, which removes the stale-read class of bugs and
/// any need for locking. Missing optional sections (e.g. no device
/// telemetry) are represented as absence, not as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalContextSnapshot {
    /// Tags this invocation and the report it produces; consumers keep only
    /// the latest id and discard superseded reports.
    pub invocation_id: Uuid,
    pub patient_id: String,
    /// Selected drug identifiers. Non-empty selection is the caller's
    /// responsibility; the orchestrator hard-fails on an empty one.
    pub drugs: Vec<String>,
    pub biomarkers: BiomarkerPanel,
    pub history: ClinicalHistory,
    /// Real-time device data; `None` when no monitoring device is paired,
    /// which skips the monitoring task without issuing its call.
    pub telemetry: Option<DeviceTelemetry>,
    pub captured_at: DateTime<Utc>,
}

impl ClinicalContextSnapshot {
    pub fn has_telemetry(&self) -> bool {
        self.telemetry.is_some()
    }
}

/// Patient biomarker panel at capture time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiomarkerPanel {
    #[serde(default)]
    pub genomic_markers: Vec<GenomicMarker>,
    #[serde(default)]
    pub ctdna: Option<CtdnaSummary>,
    /// Protein marker levels keyed by marker name.
    #[serde(default)]
    pub protein_levels: BTreeMap<String, f64>,
    #[serde(default)]
    pub metabolite_levels: BTreeMap<String, f64>,
    #[serde(default)]
    pub inflammatory_markers: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomicMarker {
    pub gene: String,
    pub alteration: String,
    /// Variant allele fraction in [0, 1], when quantified.
    #[serde(default)]
    pub vaf: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtdnaSummary {
    /// Circulating tumor DNA fraction in [0, 1].
    pub fraction: f64,
    pub trend: CtdnaTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CtdnaTrend {
    Decreasing,
    Stable,
    Increasing,
}

/// Synthetic clinical context accompanying the biomarker panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalHistory {
    #[serde(default)]
    pub prior_treatments: Vec<PriorTreatment>,
    #[serde(default)]
    pub comorbidities: Vec<String>,
    #[serde(default)]
    pub recent_labs: Vec<LabValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorTreatment {
    pub name: String,
    #[serde(default)]
    pub outcome: Option<TreatmentOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TreatmentOutcome {
    CompleteResponse,
    PartialResponse,
    StableDisease,
    Progression,
    Discontinued,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabValue {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub observed_at: DateTime<Utc>,
}

/// Real-time monitoring input: device samples plus the patient symptom log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceTelemetry {
    #[serde(default)]
    pub samples: Vec<TelemetrySample>,
    #[serde(default)]
    pub symptom_log: Vec<SymptomEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub metric: String,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomEntry {
    pub symptom: String,
    /// Patient-reported severity, 0 (absent) to 10 (worst).
    pub severity: u8,
    pub reported_at: DateTime<Utc>,
}
