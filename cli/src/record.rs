use serde::Deserialize;
use std::path::Path;

use oncopanel_core::error::CliError;
use oncopanel_core::snapshot::{
    BiomarkerPanel, ClinicalContextSnapshot, ClinicalHistory, DeviceTelemetry, SnapshotBuilder,
};

/// Patient record as stored on disk. Drugs are not part of the record; the
/// selection comes from the command line per invocation.
#[derive(Debug, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    #[serde(default)]
    pub biomarkers: BiomarkerPanel,
    #[serde(default)]
    pub history: ClinicalHistory,
    #[serde(default)]
    pub telemetry: Option<DeviceTelemetry>,
}

impl PatientRecord {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            CliError::PatientRecord(format!("{}: {}", path.display(), e))
        })
    }

    pub fn into_snapshot(self, drugs: Vec<String>) -> ClinicalContextSnapshot {
        SnapshotBuilder::new(self.patient_id, drugs)
            .biomarkers(self.biomarkers)
            .history(self.history)
            .telemetry(self.telemetry)
            .build()
    }
}

pub const EXAMPLE_RECORD: &str = r#"{
  "patient_id": "patient-001",
  "biomarkers": {
    "genomic_markers": [
      { "gene": "EGFR", "alteration": "L858R", "vaf": 0.31 }
    ],
    "ctdna": { "fraction": 0.04, "trend": "decreasing" },
    "protein_levels": { "PD-L1": 55.0 },
    "inflammatory_markers": { "CRP": 4.2 }
  },
  "history": {
    "prior_treatments": [
      { "name": "carboplatin", "outcome": "partial-response" }
    ],
    "comorbidities": ["hypertension"],
    "recent_labs": [
      { "name": "creatinine", "value": 0.9, "unit": "mg/dL", "observed_at": "2026-08-01T09:30:00Z" }
    ]
  },
  "telemetry": {
    "samples": [
      { "metric": "heart_rate", "value": 72.0, "recorded_at": "2026-08-29T08:00:00Z" }
    ],
    "symptom_log": [
      { "symptom": "fatigue", "severity": 3, "reported_at": "2026-08-29T08:05:00Z" }
    ]
  }
}
"#;
