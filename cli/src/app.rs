use std::sync::Arc;
use std::time::Duration;

use oncopanel_core::config::AppConfig;
use oncopanel_core::error::CliError;
use oncopanel_core::orchestrator::{AggregateReport, OrchestrationEngine, ReportObserver};

use crate::cli::{OutputFormat, RunArgs};
use crate::record::PatientRecord;
use crate::render;

/// Load the record, run one orchestration, and print the report.
///
/// Exit code 0 means every launched task fulfilled; 1 means the report is
/// usable but degraded (at least one rejected slot). Hard failures surface
/// as `Err` and map to their own codes in `main`.
pub async fn run(args: RunArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let record = PatientRecord::load(&args.patient)?;
    let snapshot = Arc::new(record.into_snapshot(args.drugs.clone()));

    let task_set = oncopanel_plugins::factory::build_task_set(cfg)?;

    let timeout = match args.timeout_secs {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => cfg.orchestrator.task_timeout(),
    };

    let mut builder = OrchestrationEngine::builder(task_set).task_timeout(timeout);
    if args.stream {
        builder = builder.observer(Arc::new(render::StderrProgress) as Arc<dyn ReportObserver>);
    }
    let engine = builder.build();

    let report = match engine.run(Arc::clone(&snapshot)).await {
        Ok(report) => report,
        Err(err) => {
            // Machine consumers always get a report document, even when the
            // orchestration machinery itself failed.
            if args.format == OutputFormat::Json {
                let failed = AggregateReport::hard_failure(snapshot.invocation_id, err.to_string());
                println!("{}", render::render_json(&failed)?);
            }
            return Err(err.into());
        }
    };

    match args.format {
        OutputFormat::Text => print!(
            "{}",
            render::render_text(&report, &snapshot, cfg.orchestrator.degraded_slots)
        ),
        OutputFormat::Json => println!("{}", render::render_json(&report)?),
    }

    Ok(if report.rejected_count() > 0 { 1 } else { 0 })
}
