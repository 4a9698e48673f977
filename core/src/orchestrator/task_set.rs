use std::sync::Arc;

use super::traits::PredictionSubsystem;
use crate::error::OrchestratorError;
use crate::prediction::TaskName;

/// Fixed, ordered set of task descriptors for one orchestration.
///
/// Names must be unique within the set; a duplicate is a hard failure
/// detected here, before any scatter begins. Launch order is insertion
/// order, though tasks are causally independent and no completion-order
/// guarantee exists.
#[derive(Clone)]
pub struct TaskSet {
    tasks: Vec<Arc<dyn PredictionSubsystem>>,
}

impl std::fmt::Debug for TaskSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSet")
            .field(
                "tasks",
                &self.tasks.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl TaskSet {
    pub fn new(tasks: Vec<Arc<dyn PredictionSubsystem>>) -> Result<Self, OrchestratorError> {
        if tasks.is_empty() {
            return Err(OrchestratorError::EmptyTaskSet);
        }
        let mut seen: Vec<TaskName> = Vec::with_capacity(tasks.len());
        for task in &tasks {
            let name = task.name();
            if seen.contains(&name) {
                return Err(OrchestratorError::DuplicateTask(name));
            }
            seen.push(name);
        }
        Ok(Self { tasks })
    }

    pub fn names(&self) -> Vec<TaskName> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn PredictionSubsystem>> {
        self.tasks.iter()
    }

    /// Same descriptors in reversed launch order. Outcomes must not depend
    /// on launch order; tests exercise this.
    pub fn reversed(&self) -> Self {
        let mut tasks = self.tasks.clone();
        tasks.reverse();
        Self { tasks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    use crate::error::SubsystemError;
    use crate::prediction::{DiscoveryReport, PredictionValue};
    use crate::snapshot::ClinicalContextSnapshot;

    struct Stub(TaskName);

    #[async_trait]
    impl PredictionSubsystem for Stub {
        fn name(&self) -> TaskName {
            self.0
        }

        async fn predict(
            &self,
            _snapshot: Arc<ClinicalContextSnapshot>,
        ) -> Result<PredictionValue, SubsystemError> {
            Ok(PredictionValue::Discovery(DiscoveryReport {
                candidates: vec![],
            }))
        }
    }

    #[test]
    fn empty_set_is_a_hard_failure() {
        let err = TaskSet::new(vec![]).unwrap_err();
        assert!(matches!(err, OrchestratorError::EmptyTaskSet));
    }

    #[test]
    fn duplicate_names_are_a_hard_failure() {
        let tasks: Vec<Arc<dyn PredictionSubsystem>> = vec![
            Arc::new(Stub(TaskName::AdverseEvents)),
            Arc::new(Stub(TaskName::AdverseEvents)),
        ];
        let err = TaskSet::new(tasks).unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::DuplicateTask(TaskName::AdverseEvents)
        ));
    }

    #[test]
    fn names_preserve_insertion_order() {
        let tasks: Vec<Arc<dyn PredictionSubsystem>> = vec![
            Arc::new(Stub(TaskName::RealWorldEvidence)),
            Arc::new(Stub(TaskName::AdverseEvents)),
        ];
        let set = TaskSet::new(tasks).unwrap();
        assert_eq!(
            set.names(),
            vec![TaskName::RealWorldEvidence, TaskName::AdverseEvents]
        );
        assert_eq!(
            set.reversed().names(),
            vec![TaskName::AdverseEvents, TaskName::RealWorldEvidence]
        );
    }
}
