use async_trait::async_trait;
use std::sync::Arc;

use oncopanel_core::error::SubsystemError;
use oncopanel_core::orchestrator::traits::PredictionSubsystem;
use oncopanel_core::prediction::{
    AdverseEventPrediction, PredictionValue, Severity, TaskName,
};
use oncopanel_core::snapshot::ClinicalContextSnapshot;

use super::unit_score;

/// Drug-class toxicity profiles keyed by name substring.
const TOXICITY_PROFILES: &[(&str, &[(&str, Severity)])] = &[
    (
        "mab",
        &[
            ("immune-related colitis", Severity::Severe),
            ("dermatitis", Severity::Moderate),
            ("thyroiditis", Severity::Moderate),
        ],
    ),
    (
        "tinib",
        &[
            ("QT prolongation", Severity::Severe),
            ("diarrhea", Severity::Moderate),
            ("rash", Severity::Mild),
        ],
    ),
    (
        "platin",
        &[
            ("nephrotoxicity", Severity::Severe),
            ("peripheral neuropathy", Severity::Moderate),
            ("nausea", Severity::Mild),
        ],
    ),
];

const GENERIC_EVENTS: &[(&str, Severity)] =
    &[("fatigue", Severity::Mild), ("nausea", Severity::Mild)];

pub struct SyntheticAdverseEventModel;

impl SyntheticAdverseEventModel {
    fn events_for(drug: &str) -> &'static [(&'static str, Severity)] {
        TOXICITY_PROFILES
            .iter()
            .find(|(class, _)| drug.contains(class))
            .map(|(_, events)| *events)
            .unwrap_or(GENERIC_EVENTS)
    }
}

#[async_trait]
impl PredictionSubsystem for SyntheticAdverseEventModel {
    fn name(&self) -> TaskName {
        TaskName::AdverseEvents
    }

    async fn predict(
        &self,
        snapshot: Arc<ClinicalContextSnapshot>,
    ) -> Result<PredictionValue, SubsystemError> {
        // Inflammatory burden shifts every probability upwards.
        let inflammation_boost = if snapshot
            .biomarkers
            .inflammatory_markers
            .values()
            .any(|v| *v > 10.0)
        {
            0.15
        } else {
            0.0
        };

        let contributing: Vec<String> = snapshot
            .biomarkers
            .genomic_markers
            .iter()
            .map(|m| m.gene.clone())
            .collect();

        let mut predictions = Vec::new();
        for drug in &snapshot.drugs {
            for (event, severity) in Self::events_for(drug) {
                let base = unit_score(&format!("{}:{}:{}", snapshot.patient_id, drug, event));
                let probability = (base * 0.6 + inflammation_boost).min(1.0);
                if probability < 0.05 {
                    continue;
                }
                predictions.push(AdverseEventPrediction {
                    event: format!("{event} ({drug})"),
                    probability,
                    severity: *severity,
                    contributing_markers: contributing.clone(),
                });
            }
        }
        predictions.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::debug!(
            target: "oncopanel.synthetic",
            stage = "adverse_events.out",
            drugs = snapshot.drugs.len(),
            predictions = predictions.len()
        );
        Ok(PredictionValue::AdverseEvents(predictions))
    }
}
