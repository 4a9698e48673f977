use async_trait::async_trait;
use std::sync::Arc;

use oncopanel_core::error::SubsystemError;
use oncopanel_core::orchestrator::traits::PredictionSubsystem;
use oncopanel_core::prediction::{PredictionValue, RweReport, TaskName};
use oncopanel_core::snapshot::ClinicalContextSnapshot;

use super::unit_score;

pub struct SyntheticRweModel;

#[async_trait]
impl PredictionSubsystem for SyntheticRweModel {
    fn name(&self) -> TaskName {
        TaskName::RealWorldEvidence
    }

    async fn predict(
        &self,
        snapshot: Arc<ClinicalContextSnapshot>,
    ) -> Result<PredictionValue, SubsystemError> {
        let regimen = snapshot.drugs.join("+");

        // Matched cohort shrinks as the matching criteria get stricter.
        let strictness = snapshot.biomarkers.genomic_markers.len()
            + snapshot.history.comorbidities.len();
        let base = 80 + (unit_score(&regimen) * 900.0) as u32;
        let cohort_size = (base / (1 + strictness as u32)).max(12);

        let response_rate = unit_score(&format!("rwe:{regimen}")) * 0.8;

        let mut observed_patterns = Vec::new();
        for comorbidity in &snapshot.history.comorbidities {
            if unit_score(&format!("{regimen}:{comorbidity}")) > 0.5 {
                observed_patterns.push(format!(
                    "reduced tolerability in patients with {comorbidity}"
                ));
            }
        }
        for marker in &snapshot.biomarkers.genomic_markers {
            if unit_score(&format!("{regimen}:{}", marker.gene)) > 0.6 {
                observed_patterns.push(format!(
                    "{}-altered cohort responded above average",
                    marker.gene
                ));
            }
        }

        tracing::debug!(
            target: "oncopanel.synthetic",
            stage = "rwe.out",
            cohort_size,
            patterns = observed_patterns.len()
        );
        Ok(PredictionValue::RealWorldEvidence(RweReport {
            cohort_size,
            response_rate,
            observed_patterns,
        }))
    }
}
