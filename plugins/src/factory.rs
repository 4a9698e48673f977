use anyhow::Result;
use std::sync::Arc;

use oncopanel_core::config::{AppConfig, BackendProvider};
use oncopanel_core::orchestrator::{PredictionSubsystem, TaskSet};
use oncopanel_core::prediction::TaskName;

use crate::remote::{HttpClient, RemotePredictionSubsystem};
use crate::synthetic::{
    SyntheticAdverseEventModel, SyntheticDiscoveryModel, SyntheticMonitoringModel,
    SyntheticResponseModel, SyntheticRweModel,
};

/// Assemble the full five-task set for the configured backend.
pub fn build_task_set(cfg: &AppConfig) -> Result<TaskSet> {
    let subsystems: Vec<Arc<dyn PredictionSubsystem>> = match &cfg.backend.provider {
        BackendProvider::Synthetic => vec![
            Arc::new(SyntheticAdverseEventModel),
            Arc::new(SyntheticResponseModel),
            Arc::new(SyntheticDiscoveryModel),
            Arc::new(SyntheticRweModel),
            Arc::new(SyntheticMonitoringModel),
        ],
        BackendProvider::Remote(remote) => {
            let client = Arc::new(HttpClient::new(
                remote.base_url.clone(),
                remote.api_key.clone(),
                remote.timeout_ms,
            )?);
            TaskName::all()
                .into_iter()
                .map(|task| {
                    Arc::new(RemotePredictionSubsystem::new(task, Arc::clone(&client)))
                        as Arc<dyn PredictionSubsystem>
                })
                .collect()
        }
    };
    Ok(TaskSet::new(subsystems)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oncopanel_core::config::{BackendConfig, RemoteBackendConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn synthetic_backend_yields_the_full_descriptor_set() {
        let set = build_task_set(&AppConfig::default()).unwrap();
        assert_eq!(set.names(), TaskName::all().to_vec());
    }

    #[test]
    fn remote_backend_yields_one_subsystem_per_task() {
        let cfg = AppConfig {
            backend: BackendConfig {
                provider: BackendProvider::Remote(RemoteBackendConfig::default()),
            },
            ..AppConfig::default()
        };
        let set = build_task_set(&cfg).unwrap();
        assert_eq!(set.len(), 5);
        assert_eq!(set.names(), TaskName::all().to_vec());
    }
}
