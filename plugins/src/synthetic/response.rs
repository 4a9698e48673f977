use async_trait::async_trait;
use std::sync::Arc;

use oncopanel_core::error::SubsystemError;
use oncopanel_core::orchestrator::traits::PredictionSubsystem;
use oncopanel_core::prediction::{PredictionValue, ResponsePrediction, TaskName};
use oncopanel_core::snapshot::{ClinicalContextSnapshot, CtdnaTrend, TreatmentOutcome};

use super::unit_score;

pub struct SyntheticResponseModel;

#[async_trait]
impl PredictionSubsystem for SyntheticResponseModel {
    fn name(&self) -> TaskName {
        TaskName::TreatmentResponse
    }

    async fn predict(
        &self,
        snapshot: Arc<ClinicalContextSnapshot>,
    ) -> Result<PredictionValue, SubsystemError> {
        let mut rationale = Vec::new();

        // Base probability: mean of per-(drug, gene) scores, falling back to
        // a per-drug score when no genomic markers are present.
        let mut scores = Vec::new();
        for drug in &snapshot.drugs {
            if snapshot.biomarkers.genomic_markers.is_empty() {
                scores.push(unit_score(&format!("{}:{}", snapshot.patient_id, drug)));
            }
            for marker in &snapshot.biomarkers.genomic_markers {
                let score = unit_score(&format!("{}:{}:{}", drug, marker.gene, marker.alteration));
                if score > 0.7 {
                    rationale.push(format!(
                        "{} {} is associated with sensitivity to {}",
                        marker.gene, marker.alteration, drug
                    ));
                }
                scores.push(score);
            }
        }
        let mut probability = scores.iter().sum::<f64>() / scores.len().max(1) as f64;

        if let Some(ctdna) = &snapshot.biomarkers.ctdna {
            match ctdna.trend {
                CtdnaTrend::Decreasing => {
                    probability = (probability + 0.2).min(0.95);
                    rationale.push("declining ctDNA fraction".to_string());
                }
                CtdnaTrend::Increasing => {
                    probability = (probability - 0.2).max(0.05);
                    rationale.push("rising ctDNA fraction".to_string());
                }
                CtdnaTrend::Stable => {}
            }
        }

        let progressed_before = snapshot
            .history
            .prior_treatments
            .iter()
            .filter(|t| {
                snapshot.drugs.contains(&t.name)
                    && t.outcome == Some(TreatmentOutcome::Progression)
            })
            .count();
        if progressed_before > 0 {
            probability = (probability * 0.5).max(0.02);
            rationale.push(format!(
                "prior progression on {progressed_before} of the selected agents"
            ));
        }

        // Confidence grows with the evidence available to the model.
        let evidence = snapshot.biomarkers.genomic_markers.len()
            + snapshot.history.prior_treatments.len()
            + usize::from(snapshot.biomarkers.ctdna.is_some());
        let confidence = (0.3 + 0.1 * evidence as f64).min(0.9);

        let expected_duration_weeks = if probability > 0.3 {
            Some((probability * 52.0).round())
        } else {
            None
        };

        tracing::debug!(
            target: "oncopanel.synthetic",
            stage = "response.out",
            probability,
            confidence,
            rationale = rationale.len()
        );
        Ok(PredictionValue::TreatmentResponse(ResponsePrediction {
            response_probability: probability,
            confidence,
            expected_duration_weeks,
            rationale,
        }))
    }
}
