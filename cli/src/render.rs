use oncopanel_core::config::DegradedSlotPolicy;
use oncopanel_core::error::CliError;
use oncopanel_core::orchestrator::{
    AggregateReport, OrchestrationEvent, ReportObserver, SlotState, TaskOutcome,
};
use oncopanel_core::prediction::PredictionValue;
use oncopanel_core::snapshot::ClinicalContextSnapshot;

fn pct(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

/// Render the aggregate report as human-readable text.
///
/// Degraded slots are annotated with their reason or omitted entirely,
/// depending on the configured policy; the underlying report is unchanged
/// either way.
pub fn render_text(
    report: &AggregateReport,
    snapshot: &ClinicalContextSnapshot,
    policy: DegradedSlotPolicy,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "report {} for {} ({}) {:?} in {}ms\n",
        report.invocation_id,
        snapshot.patient_id,
        snapshot.drugs.join(", "),
        report.status(),
        report.duration_ms
    ));

    for (task, state) in report.iter() {
        match state {
            SlotState::Pending => {
                out.push_str(&format!("{task}: pending\n"));
            }
            SlotState::Settled { outcome } => match outcome {
                TaskOutcome::Fulfilled { value } => {
                    out.push_str(&format!("{task}:\n"));
                    render_value(&mut out, value);
                }
                TaskOutcome::Rejected { detail } => {
                    if policy == DegradedSlotPolicy::Annotate {
                        out.push_str(&format!("{task}: unavailable ({})\n", detail.message));
                    }
                }
                TaskOutcome::Skipped => {
                    if policy == DegradedSlotPolicy::Annotate {
                        out.push_str(&format!("{task}: not applicable\n"));
                    }
                }
            },
        }
    }
    out
}

fn render_value(out: &mut String, value: &PredictionValue) {
    match value {
        PredictionValue::AdverseEvents(events) => {
            if events.is_empty() {
                out.push_str("  no adverse events predicted\n");
            }
            for e in events {
                out.push_str(&format!(
                    "  - {} {} ({:?})\n",
                    e.event,
                    pct(e.probability),
                    e.severity
                ));
            }
        }
        PredictionValue::TreatmentResponse(p) => {
            out.push_str(&format!(
                "  response probability {} (confidence {})\n",
                pct(p.response_probability),
                pct(p.confidence)
            ));
            for reason in &p.rationale {
                out.push_str(&format!("  - {reason}\n"));
            }
        }
        PredictionValue::Discovery(report) => {
            if report.candidates.is_empty() {
                out.push_str("  no combination candidates\n");
            }
            for c in &report.candidates {
                out.push_str(&format!(
                    "  - {} synergy {} via {}\n",
                    c.drugs.join(" + "),
                    pct(c.synergy_score),
                    c.mechanism
                ));
            }
        }
        PredictionValue::RealWorldEvidence(report) => {
            out.push_str(&format!(
                "  cohort {}, response rate {}\n",
                report.cohort_size,
                pct(report.response_rate)
            ));
            for p in &report.observed_patterns {
                out.push_str(&format!("  - {p}\n"));
            }
        }
        PredictionValue::Monitoring(insight) => {
            out.push_str(&format!(
                "  adherence {}, symptoms {:?}\n",
                pct(insight.adherence_score),
                insight.symptom_trend
            ));
            for alert in &insight.alerts {
                out.push_str(&format!("  ! {alert}\n"));
            }
        }
    }
}

pub fn render_json(report: &AggregateReport) -> Result<String, CliError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| CliError::Command(format!("report serialization failed: {e}")))
}

/// Observer printing settlement progress to stderr, keeping stdout clean
/// for the final report.
pub struct StderrProgress;

impl ReportObserver for StderrProgress {
    fn on_event(&self, event: &OrchestrationEvent) {
        match event {
            OrchestrationEvent::TaskSkipped { task, .. } => {
                eprintln!("[skip]    {task}");
            }
            OrchestrationEvent::TaskSettled {
                task,
                outcome,
                duration_ms,
                ..
            } => {
                let state = match outcome {
                    TaskOutcome::Fulfilled { .. } => "fulfilled",
                    TaskOutcome::Rejected { .. } => "rejected",
                    TaskOutcome::Skipped => "skipped",
                };
                eprintln!("[settled] {task} {state} ({duration_ms}ms)");
            }
            _ => {}
        }
    }
}
