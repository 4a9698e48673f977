use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use oncopanel_core::error::SubsystemError;
use oncopanel_core::orchestrator::traits::PredictionSubsystem;
use oncopanel_core::prediction::{PredictionValue, TaskName};
use oncopanel_core::snapshot::ClinicalContextSnapshot;

use super::http_client::{HttpClient, PredictionHttpError, PredictionHttpErrorKind};

/// One remote task: a task name bound to the shared service client.
///
/// The orchestrator sees five independent subsystems; behind them sits one
/// connection-pooled [`HttpClient`].
pub struct RemotePredictionSubsystem {
    task: TaskName,
    client: Arc<HttpClient>,
}

impl RemotePredictionSubsystem {
    pub fn new(task: TaskName, client: Arc<HttpClient>) -> Self {
        Self { task, client }
    }

    fn decode(&self, payload: Value) -> Result<PredictionValue, SubsystemError> {
        let invalid = |err: serde_json::Error| {
            SubsystemError::InvalidPayload(format!("{} payload: {}", self.task, err))
        };
        let value = match self.task {
            TaskName::AdverseEvents => {
                PredictionValue::AdverseEvents(serde_json::from_value(payload).map_err(invalid)?)
            }
            TaskName::TreatmentResponse => PredictionValue::TreatmentResponse(
                serde_json::from_value(payload).map_err(invalid)?,
            ),
            TaskName::CombinatorialDiscovery => {
                PredictionValue::Discovery(serde_json::from_value(payload).map_err(invalid)?)
            }
            TaskName::RealWorldEvidence => PredictionValue::RealWorldEvidence(
                serde_json::from_value(payload).map_err(invalid)?,
            ),
            TaskName::RealTimeMonitoring => {
                PredictionValue::Monitoring(serde_json::from_value(payload).map_err(invalid)?)
            }
        };
        Ok(value)
    }
}

fn map_call_error(err: anyhow::Error) -> SubsystemError {
    match err.downcast_ref::<PredictionHttpError>() {
        Some(http_err) => match http_err.kind() {
            PredictionHttpErrorKind::Decode | PredictionHttpErrorKind::Body => {
                SubsystemError::InvalidPayload(http_err.to_string())
            }
            _ => SubsystemError::Unavailable(http_err.to_string()),
        },
        None => SubsystemError::Internal(err),
    }
}

#[async_trait]
impl PredictionSubsystem for RemotePredictionSubsystem {
    fn name(&self) -> TaskName {
        self.task
    }

    fn applies_to(&self, snapshot: &ClinicalContextSnapshot) -> bool {
        self.task != TaskName::RealTimeMonitoring || snapshot.has_telemetry()
    }

    async fn predict(
        &self,
        snapshot: Arc<ClinicalContextSnapshot>,
    ) -> Result<PredictionValue, SubsystemError> {
        let payload = self
            .client
            .predict(self.task, &snapshot)
            .await
            .map_err(map_call_error)?;
        self.decode(payload)
    }
}
