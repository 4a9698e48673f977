use async_trait::async_trait;
use std::sync::Arc;

use oncopanel_core::error::SubsystemError;
use oncopanel_core::orchestrator::traits::PredictionSubsystem;
use oncopanel_core::prediction::{MonitoringInsight, PredictionValue, SymptomTrend, TaskName};
use oncopanel_core::snapshot::{ClinicalContextSnapshot, DeviceTelemetry};

const ALERT_SEVERITY: u8 = 7;

/// Real-time monitoring only applies when a device is paired; its skip
/// predicate keeps the task from ever being launched on snapshots without
/// telemetry.
pub struct SyntheticMonitoringModel;

impl SyntheticMonitoringModel {
    fn trend(telemetry: &DeviceTelemetry) -> SymptomTrend {
        let log = &telemetry.symptom_log;
        if log.len() < 2 {
            return SymptomTrend::Stable;
        }
        let mid = log.len() / 2;
        let mean = |entries: &[oncopanel_core::snapshot::SymptomEntry]| {
            entries.iter().map(|e| e.severity as f64).sum::<f64>() / entries.len() as f64
        };
        let delta = mean(&log[mid..]) - mean(&log[..mid]);
        if delta > 0.5 {
            SymptomTrend::Worsening
        } else if delta < -0.5 {
            SymptomTrend::Improving
        } else {
            SymptomTrend::Stable
        }
    }
}

#[async_trait]
impl PredictionSubsystem for SyntheticMonitoringModel {
    fn name(&self) -> TaskName {
        TaskName::RealTimeMonitoring
    }

    fn applies_to(&self, snapshot: &ClinicalContextSnapshot) -> bool {
        snapshot.has_telemetry()
    }

    async fn predict(
        &self,
        snapshot: Arc<ClinicalContextSnapshot>,
    ) -> Result<PredictionValue, SubsystemError> {
        let telemetry = snapshot.telemetry.as_ref().ok_or_else(|| {
            SubsystemError::InvalidPayload("monitoring invoked without telemetry".to_string())
        })?;

        let alerts: Vec<String> = telemetry
            .symptom_log
            .iter()
            .filter(|entry| entry.severity >= ALERT_SEVERITY)
            .map(|entry| {
                format!(
                    "severe patient-reported {} (severity {}/10)",
                    entry.symptom, entry.severity
                )
            })
            .collect();

        // Sparse device data reads as imperfect adherence.
        let adherence_score = match telemetry.samples.len() {
            0 => 0.2,
            n => (0.5 + n as f64 * 0.05).min(1.0),
        };

        let insight = MonitoringInsight {
            alerts,
            adherence_score,
            symptom_trend: Self::trend(telemetry),
        };
        tracing::debug!(
            target: "oncopanel.synthetic",
            stage = "monitoring.out",
            alerts = insight.alerts.len(),
            trend = ?insight.symptom_trend
        );
        Ok(PredictionValue::Monitoring(insight))
    }
}
