use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::cancel::CancelToken;
use super::report::{AggregateReport, RejectDetail, TaskOutcome};
use super::scatter::{settle_all, SettledTask};
use super::task_set::TaskSet;
use super::traits::{OrchestrationEvent, PredictionSubsystem, ReportObserver};
use crate::error::OrchestratorError;
use crate::snapshot::ClinicalContextSnapshot;

/// Scatter-gather engine for one task set.
///
/// `run` launches every non-skipped task concurrently and resolves only
/// once every task (skipped, fulfilled, or rejected) is terminal. A
/// single task's rejection never aborts a sibling or the run itself; only
/// a failure of the machinery before the scatter (`OrchestratorError`)
/// propagates as `Err`.
pub struct OrchestrationEngine {
    tasks: TaskSet,
    task_timeout: Option<Duration>,
    cancel: Option<CancelToken>,
    observer: Option<Arc<dyn ReportObserver>>,
}

pub struct OrchestrationEngineBuilder {
    tasks: TaskSet,
    task_timeout: Option<Duration>,
    cancel: Option<CancelToken>,
    observer: Option<Arc<dyn ReportObserver>>,
}

impl OrchestrationEngine {
    pub fn new(tasks: TaskSet) -> Self {
        Self::builder(tasks).build()
    }

    pub fn builder(tasks: TaskSet) -> OrchestrationEngineBuilder {
        OrchestrationEngineBuilder {
            tasks,
            task_timeout: None,
            cancel: None,
            observer: None,
        }
    }

    /// Run one orchestration over `snapshot`.
    ///
    /// No implicit retries and no cross-invocation caching: an identical
    /// snapshot run twice issues every external call twice. Retry policy
    /// belongs to the caller.
    pub async fn run(
        &self,
        snapshot: Arc<ClinicalContextSnapshot>,
    ) -> Result<AggregateReport, OrchestratorError> {
        // Hard-failure validation happens before anything is launched; this
        // is a different code path from a per-task rejection.
        if snapshot.drugs.is_empty() {
            return Err(OrchestratorError::EmptyDrugSelection);
        }

        let invocation_id = snapshot.invocation_id;
        let started = Instant::now();
        let mut report = AggregateReport::pending(invocation_id, &self.tasks.names());

        self.emit(&OrchestrationEvent::RunStarted {
            invocation_id,
            total_tasks: self.tasks.len(),
        });
        tracing::info!(
            target: "oncopanel.orchestrator",
            invocation_id = %invocation_id,
            tasks = self.tasks.len(),
            drugs = snapshot.drugs.len(),
            "scatter start"
        );

        let mut launches = Vec::with_capacity(self.tasks.len());
        for subsystem in self.tasks.iter() {
            let task = subsystem.name();
            if !subsystem.applies_to(&snapshot) {
                // Settles immediately; the underlying call is never issued.
                tracing::debug!(
                    target: "oncopanel.orchestrator",
                    task = %task,
                    "skip predicate matched; call not issued"
                );
                report.settle(task, TaskOutcome::Skipped);
                self.emit(&OrchestrationEvent::TaskSkipped {
                    invocation_id,
                    task,
                });
                continue;
            }

            self.emit(&OrchestrationEvent::TaskStarted {
                invocation_id,
                task,
            });

            let subsystem = Arc::clone(subsystem);
            let snapshot = Arc::clone(&snapshot);
            let timeout = self.task_timeout;
            let cancel = self.cancel.clone();
            launches.push(async move {
                let task_started = Instant::now();
                let outcome = settle_one(subsystem, snapshot, timeout, cancel).await;
                SettledTask {
                    task,
                    outcome,
                    duration_ms: task_started.elapsed().as_millis() as u64,
                }
            });
        }

        settle_all(launches, |settled| {
            report.settle(settled.task, settled.outcome.clone());
            match &settled.outcome {
                TaskOutcome::Rejected { detail } => tracing::warn!(
                    target: "oncopanel.orchestrator",
                    task = %settled.task,
                    kind = ?detail.kind,
                    duration_ms = settled.duration_ms,
                    "task rejected: {}",
                    detail.message
                ),
                TaskOutcome::Fulfilled { .. } => tracing::debug!(
                    target: "oncopanel.orchestrator",
                    task = %settled.task,
                    duration_ms = settled.duration_ms,
                    "task fulfilled"
                ),
                TaskOutcome::Skipped => {}
            }
            self.emit(&OrchestrationEvent::TaskSettled {
                invocation_id,
                task: settled.task,
                outcome: settled.outcome.clone(),
                duration_ms: settled.duration_ms,
                status: report.status(),
            });
        })
        .await;

        report.duration_ms = started.elapsed().as_millis() as u64;
        self.emit(&OrchestrationEvent::RunCompleted {
            invocation_id,
            status: report.status(),
            fulfilled: report.fulfilled_count(),
            rejected: report.rejected_count(),
            skipped: report.skipped_count(),
            duration_ms: report.duration_ms,
        });
        tracing::info!(
            target: "oncopanel.orchestrator",
            invocation_id = %invocation_id,
            status = ?report.status(),
            fulfilled = report.fulfilled_count(),
            rejected = report.rejected_count(),
            skipped = report.skipped_count(),
            duration_ms = report.duration_ms,
            "gather complete"
        );

        Ok(report)
    }

    fn emit(&self, event: &OrchestrationEvent) {
        if let Some(observer) = &self.observer {
            observer.on_event(event);
        }
    }
}

impl OrchestrationEngineBuilder {
    /// Per-task deadline. Expiry synthesizes a `Rejected` outcome with kind
    /// `Timeout` instead of stalling the join barrier; `None` leaves the
    /// call unbounded.
    pub fn task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    /// Cancellation token for this invocation. Once fired, still-pending
    /// tasks settle `Rejected` with kind `Cancelled`; already-settled slots
    /// are kept, so the join barrier still releases normally.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ReportObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> OrchestrationEngine {
        OrchestrationEngine {
            tasks: self.tasks,
            task_timeout: self.task_timeout,
            cancel: self.cancel,
            observer: self.observer,
        }
    }
}

/// Resolve one task to its terminal outcome. Never returns an error: every
/// failure mode is folded into the outcome so the gather loop cannot be
/// poisoned by an individual task.
async fn settle_one(
    subsystem: Arc<dyn PredictionSubsystem>,
    snapshot: Arc<ClinicalContextSnapshot>,
    timeout: Option<Duration>,
    cancel: Option<CancelToken>,
) -> TaskOutcome {
    let expected = subsystem.name();
    let call = async move {
        match subsystem.predict(snapshot).await {
            Ok(value) if value.task_name() == expected => TaskOutcome::fulfilled(value),
            Ok(value) => TaskOutcome::rejected(RejectDetail::subsystem(format!(
                "subsystem returned a {} payload for the {} task",
                value.task_name(),
                expected
            ))),
            Err(err) => TaskOutcome::rejected(RejectDetail::subsystem(err.to_string())),
        }
    };

    let timed = async move {
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => TaskOutcome::rejected(RejectDetail::timeout(limit)),
            },
            None => call.await,
        }
    };

    match cancel {
        Some(token) if token.is_cancelled() => {
            TaskOutcome::rejected(RejectDetail::cancelled())
        }
        Some(token) => tokio::select! {
            outcome = timed => outcome,
            _ = token.cancelled() => TaskOutcome::rejected(RejectDetail::cancelled()),
        },
        None => timed.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::error::SubsystemError;
    use crate::orchestrator::cancel::cancel_pair;
    use crate::orchestrator::report::{RejectKind, ReportStatus};
    use crate::prediction::{
        DiscoveryReport, MonitoringInsight, PredictionValue, ResponsePrediction, RweReport,
        SymptomTrend, TaskName,
    };
    use crate::snapshot::{DeviceTelemetry, SnapshotBuilder};

    fn payload_for(name: TaskName) -> PredictionValue {
        match name {
            TaskName::AdverseEvents => PredictionValue::AdverseEvents(vec![]),
            TaskName::TreatmentResponse => {
                PredictionValue::TreatmentResponse(ResponsePrediction {
                    response_probability: 0.5,
                    confidence: 0.5,
                    expected_duration_weeks: None,
                    rationale: vec![],
                })
            }
            TaskName::CombinatorialDiscovery => {
                PredictionValue::Discovery(DiscoveryReport { candidates: vec![] })
            }
            TaskName::RealWorldEvidence => PredictionValue::RealWorldEvidence(RweReport {
                cohort_size: 12,
                response_rate: 0.4,
                observed_patterns: vec![],
            }),
            TaskName::RealTimeMonitoring => PredictionValue::Monitoring(MonitoringInsight {
                alerts: vec![],
                adherence_score: 1.0,
                symptom_trend: SymptomTrend::Stable,
            }),
        }
    }

    /// Controllable stand-in for an external prediction subsystem.
    struct StubSubsystem {
        name: TaskName,
        calls: Arc<AtomicUsize>,
        fail_with: Option<String>,
        delay: Option<Duration>,
        requires_telemetry: bool,
    }

    impl StubSubsystem {
        fn new(name: TaskName) -> Self {
            Self {
                name,
                calls: Arc::new(AtomicUsize::new(0)),
                fail_with: None,
                delay: None,
                requires_telemetry: false,
            }
        }

        fn monitoring() -> Self {
            Self {
                requires_telemetry: true,
                ..Self::new(TaskName::RealTimeMonitoring)
            }
        }

        fn failing(name: TaskName, message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Self::new(name)
            }
        }

        fn delayed(name: TaskName, delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new(name)
            }
        }

        fn calls(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }
    }

    #[async_trait]
    impl PredictionSubsystem for StubSubsystem {
        fn name(&self) -> TaskName {
            self.name
        }

        fn applies_to(&self, snapshot: &ClinicalContextSnapshot) -> bool {
            !self.requires_telemetry || snapshot.has_telemetry()
        }

        async fn predict(
            &self,
            _snapshot: Arc<ClinicalContextSnapshot>,
        ) -> Result<PredictionValue, SubsystemError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.fail_with {
                Some(message) => Err(SubsystemError::Unavailable(message.clone())),
                None => Ok(payload_for(self.name)),
            }
        }
    }

    fn snapshot(telemetry: bool) -> Arc<ClinicalContextSnapshot> {
        let builder = SnapshotBuilder::new("patient-1", vec!["pembrolizumab".into()]);
        let builder = if telemetry {
            builder.telemetry(Some(DeviceTelemetry::default()))
        } else {
            builder
        };
        Arc::new(builder.build())
    }

    fn full_stub_set() -> (TaskSet, Vec<Arc<AtomicUsize>>) {
        let stubs = vec![
            StubSubsystem::new(TaskName::AdverseEvents),
            StubSubsystem::new(TaskName::TreatmentResponse),
            StubSubsystem::new(TaskName::CombinatorialDiscovery),
            StubSubsystem::new(TaskName::RealWorldEvidence),
            StubSubsystem::monitoring(),
        ];
        let counters = stubs.iter().map(StubSubsystem::calls).collect();
        let tasks: Vec<Arc<dyn PredictionSubsystem>> = stubs
            .into_iter()
            .map(|s| Arc::new(s) as Arc<dyn PredictionSubsystem>)
            .collect();
        (TaskSet::new(tasks).unwrap(), counters)
    }

    #[tokio::test]
    async fn settlement_completeness_with_one_skip() {
        let (tasks, counters) = full_stub_set();
        let engine = OrchestrationEngine::new(tasks);

        let report = engine.run(snapshot(false)).await.unwrap();

        // Four calls issued, monitoring skipped without a call.
        for counter in &counters[..4] {
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
        assert_eq!(counters[4].load(Ordering::SeqCst), 0);

        // All five slots terminal.
        assert_eq!(report.status(), ReportStatus::FullySettled);
        assert_eq!(report.pending_count(), 0);
        assert_eq!(report.fulfilled_count(), 4);
        assert_eq!(report.skipped_count(), 1);
    }

    #[tokio::test]
    async fn one_rejection_does_not_degrade_siblings() {
        let stubs: Vec<Arc<dyn PredictionSubsystem>> = vec![
            Arc::new(StubSubsystem::new(TaskName::AdverseEvents)),
            Arc::new(StubSubsystem::new(TaskName::TreatmentResponse)),
            Arc::new(StubSubsystem::failing(
                TaskName::CombinatorialDiscovery,
                "timeout",
            )),
            Arc::new(StubSubsystem::new(TaskName::RealWorldEvidence)),
            Arc::new(StubSubsystem::monitoring()),
        ];
        let engine = OrchestrationEngine::new(TaskSet::new(stubs).unwrap());

        // One drug, no telemetry, discovery stub rejecting.
        let report = engine.run(snapshot(false)).await.unwrap();

        assert_eq!(report.status(), ReportStatus::FullySettled);
        assert!(report.adverse_events().is_some());
        assert!(report.treatment_response().is_some());
        assert!(report.real_world_evidence().is_some());
        match report.outcome(TaskName::CombinatorialDiscovery).unwrap() {
            TaskOutcome::Rejected { detail } => {
                assert_eq!(detail.kind, RejectKind::Subsystem);
                assert_eq!(detail.message, "timeout");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(
            report.outcome(TaskName::RealTimeMonitoring),
            Some(&TaskOutcome::Skipped)
        );
    }

    #[tokio::test]
    async fn skip_short_circuits_without_invoking_the_call() {
        let monitoring = StubSubsystem::monitoring();
        let calls = monitoring.calls();
        let tasks: Vec<Arc<dyn PredictionSubsystem>> = vec![
            Arc::new(StubSubsystem::new(TaskName::AdverseEvents)),
            Arc::new(monitoring),
        ];
        let engine = OrchestrationEngine::new(TaskSet::new(tasks).unwrap());

        let report = engine.run(snapshot(false)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            report.outcome(TaskName::RealTimeMonitoring),
            Some(&TaskOutcome::Skipped)
        );

        // With telemetry supplied the same subsystem is called.
        let report = engine.run(snapshot(true)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(report.monitoring().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn join_barrier_waits_for_the_slowest_task() {
        let tasks: Vec<Arc<dyn PredictionSubsystem>> = vec![
            Arc::new(StubSubsystem::delayed(
                TaskName::AdverseEvents,
                Duration::from_millis(10),
            )),
            Arc::new(StubSubsystem::delayed(
                TaskName::RealWorldEvidence,
                Duration::from_millis(200),
            )),
        ];
        let engine = OrchestrationEngine::new(TaskSet::new(tasks).unwrap());

        let started = Instant::now();
        let report = engine.run(snapshot(false)).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(report.adverse_events().is_some());
        assert!(report.real_world_evidence().is_some());
        assert_eq!(report.status(), ReportStatus::FullySettled);
    }

    #[tokio::test]
    async fn reversed_launch_order_yields_identical_outcomes() {
        let (tasks, _) = full_stub_set();
        let forward = OrchestrationEngine::new(tasks.clone());
        let reverse = OrchestrationEngine::new(tasks.reversed());

        let snap = snapshot(true);
        let a = forward.run(Arc::clone(&snap)).await.unwrap();
        let b = reverse.run(snap).await.unwrap();

        for name in TaskName::all() {
            assert_eq!(a.outcome(name), b.outcome(name), "slot {name} diverged");
        }
        assert_eq!(a.status(), b.status());
    }

    #[tokio::test]
    async fn re_invocation_issues_every_call_again() {
        let (tasks, counters) = full_stub_set();
        let engine = OrchestrationEngine::new(tasks);

        let snap = snapshot(true);
        engine.run(Arc::clone(&snap)).await.unwrap();
        engine.run(snap).await.unwrap();

        for counter in &counters {
            assert_eq!(counter.load(Ordering::SeqCst), 2, "no implicit caching");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_becomes_a_rejected_slot_not_a_stall() {
        let tasks: Vec<Arc<dyn PredictionSubsystem>> = vec![
            Arc::new(StubSubsystem::new(TaskName::AdverseEvents)),
            Arc::new(StubSubsystem::delayed(
                TaskName::CombinatorialDiscovery,
                Duration::from_secs(3600),
            )),
        ];
        let engine = OrchestrationEngine::builder(TaskSet::new(tasks).unwrap())
            .task_timeout(Some(Duration::from_millis(50)))
            .build();

        let started = Instant::now();
        let report = engine.run(snapshot(false)).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(3600));
        match report.outcome(TaskName::CombinatorialDiscovery).unwrap() {
            TaskOutcome::Rejected { detail } => assert_eq!(detail.kind, RejectKind::Timeout),
            other => panic!("expected timeout rejection, got {other:?}"),
        }
        assert!(report.adverse_events().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_settles_pending_slots_as_cancelled() {
        let tasks: Vec<Arc<dyn PredictionSubsystem>> = vec![
            Arc::new(StubSubsystem::delayed(
                TaskName::AdverseEvents,
                Duration::from_millis(1),
            )),
            Arc::new(StubSubsystem::delayed(
                TaskName::RealWorldEvidence,
                Duration::from_millis(500),
            )),
        ];
        let (handle, token) = cancel_pair();
        let engine = OrchestrationEngine::builder(TaskSet::new(tasks).unwrap())
            .cancel_token(token)
            .build();

        let (report, _) = tokio::join!(engine.run(snapshot(false)), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });
        let report = report.unwrap();

        // The fast task settled before the cancel, the slow one after it.
        assert!(report.adverse_events().is_some());
        match report.outcome(TaskName::RealWorldEvidence).unwrap() {
            TaskOutcome::Rejected { detail } => assert_eq!(detail.kind, RejectKind::Cancelled),
            other => panic!("expected cancelled rejection, got {other:?}"),
        }
        // The join barrier still released with every slot terminal.
        assert_eq!(report.status(), ReportStatus::FullySettled);
    }

    #[tokio::test]
    async fn empty_drug_selection_is_a_hard_failure() {
        let (tasks, counters) = full_stub_set();
        let engine = OrchestrationEngine::new(tasks);

        let snap = Arc::new(SnapshotBuilder::new("patient-1", vec![]).build());
        let err = engine.run(snap).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::EmptyDrugSelection));
        // Nothing was scattered.
        for counter in &counters {
            assert_eq!(counter.load(Ordering::SeqCst), 0);
        }
    }

    /// Observer collecting events for assertions.
    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<OrchestrationEvent>>,
    }

    impl ReportObserver for Recorder {
        fn on_event(&self, event: &OrchestrationEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn observer_sees_incremental_settlement() {
        let (tasks, _) = full_stub_set();
        let recorder = Arc::new(Recorder::default());
        let engine = OrchestrationEngine::builder(tasks)
            .observer(Arc::clone(&recorder) as Arc<dyn ReportObserver>)
            .build();

        let report = engine.run(snapshot(false)).await.unwrap();
        let events = recorder.events.lock().unwrap();

        let settled: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                OrchestrationEvent::TaskSettled { status, .. } => Some(*status),
                _ => None,
            })
            .collect();
        // Monitoring was skipped up front, so four settlements arrive; the
        // partially-complete state is observable before the last one.
        assert_eq!(settled.len(), 4);
        assert!(settled[..settled.len() - 1]
            .iter()
            .all(|s| *s == ReportStatus::PartiallyComplete));
        assert_eq!(*settled.last().unwrap(), ReportStatus::FullySettled);

        assert!(matches!(
            events.last().unwrap(),
            OrchestrationEvent::RunCompleted {
                status: ReportStatus::FullySettled,
                ..
            }
        ));
        assert_eq!(report.invocation_id, match &events[0] {
            OrchestrationEvent::RunStarted { invocation_id, .. } => *invocation_id,
            _ => panic!("first event must be RunStarted"),
        });
    }
}
