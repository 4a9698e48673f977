//! Concurrent scatter-gather orchestration over prediction subsystems
//!
//! This module turns one immutable clinical snapshot into one aggregate
//! report. It supports:
//! - Concurrent launch of every applicable task before any is awaited
//! - Per-task isolation: a rejection degrades its own slot only
//! - Skip predicates that settle a task without issuing its call
//! - Per-task timeouts and whole-invocation cancellation
//! - Incremental settlement events for streaming consumers
//!
//! # Architecture
//!
//! ```text
//! Arc<ClinicalContextSnapshot>
//!   ↓
//! TaskSet (validated: non-empty, unique names)
//!   ↓
//! OrchestrationEngine::run() → skip predicates, then scatter
//!   ↓
//! settle_all() → FuturesUnordered drained to exhaustion
//!   ↓
//! AggregateReport { slot per task: fulfilled | rejected | skipped }
//! ```

mod cancel;
mod engine;
mod report;
mod scatter;
mod task_set;
pub mod traits;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use engine::{OrchestrationEngine, OrchestrationEngineBuilder};
pub use report::{
    AggregateReport, RejectDetail, RejectKind, ReportStatus, SlotState, TaskOutcome,
};
pub use scatter::SettledTask;
pub use task_set::TaskSet;
pub use traits::{OrchestrationEvent, PredictionSubsystem, ReportObserver};
