//! Immutable clinical context captured once per orchestration invocation.

mod builder;
mod types;

pub use builder::SnapshotBuilder;
pub use types::{
    BiomarkerPanel, ClinicalContextSnapshot, ClinicalHistory, CtdnaSummary, CtdnaTrend,
    DeviceTelemetry, GenomicMarker, LabValue, PriorTreatment, SymptomEntry, TelemetrySample,
    TreatmentOutcome,
};
