use chrono::Utc;
use uuid::Uuid;

use super::types::{
    BiomarkerPanel, ClinicalContextSnapshot, ClinicalHistory, DeviceTelemetry,
};

/// Pure constructor for [`ClinicalContextSnapshot`].
///
/// Construction cannot fail: optional sections default to empty or `None`.
/// Each `build()` assigns a fresh invocation id, so two snapshots built from
/// identical inputs are still distinct invocations.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    patient_id: String,
    drugs: Vec<String>,
    biomarkers: BiomarkerPanel,
    history: ClinicalHistory,
    telemetry: Option<DeviceTelemetry>,
}

impl SnapshotBuilder {
    pub fn new(patient_id: impl Into<String>, drugs: Vec<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            drugs,
            ..Self::default()
        }
    }

    pub fn biomarkers(mut self, biomarkers: BiomarkerPanel) -> Self {
        self.biomarkers = biomarkers;
        self
    }

    pub fn history(mut self, history: ClinicalHistory) -> Self {
        self.history = history;
        self
    }

    pub fn telemetry(mut self, telemetry: Option<DeviceTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn build(self) -> ClinicalContextSnapshot {
        ClinicalContextSnapshot {
            invocation_id: Uuid::new_v4(),
            patient_id: self.patient_id,
            drugs: self.drugs,
            biomarkers: self.biomarkers,
            history: self.history,
            telemetry: self.telemetry,
            captured_at: Utc::now(),
        }
    }
}
