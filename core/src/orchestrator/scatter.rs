use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::future::Future;

use super::report::TaskOutcome;
use crate::prediction::TaskName;

/// One task's terminal record.
#[derive(Debug, Clone)]
pub struct SettledTask {
    pub task: TaskName,
    pub outcome: TaskOutcome,
    pub duration_ms: u64,
}

/// Drive every task future to its terminal state.
///
/// All futures are registered before the first poll, so every task's call
/// is fired before any is awaited, and a slow or failing task never blocks
/// a sibling from settling. This is a wait-all-settle join, not fail-fast:
/// the stream is drained to exhaustion regardless of individual outcomes,
/// and `on_settled` fires once per settlement in completion order.
pub(crate) async fn settle_all<Fut, F>(tasks: Vec<Fut>, mut on_settled: F) -> Vec<SettledTask>
where
    Fut: Future<Output = SettledTask>,
    F: FnMut(&SettledTask),
{
    let mut futs: FuturesUnordered<Fut> = tasks.into_iter().collect();
    let mut settled = Vec::with_capacity(futs.len());

    while let Some(task) = futs.next().await {
        on_settled(&task);
        settled.push(task);
    }

    settled
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settled(task: TaskName) -> SettledTask {
        SettledTask {
            task,
            outcome: TaskOutcome::Skipped,
            duration_ms: 0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn drains_every_future_regardless_of_order() {
        let futs: Vec<std::pin::Pin<Box<dyn Future<Output = SettledTask>>>> = vec![
            Box::pin(async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                settled(TaskName::AdverseEvents)
            }),
            Box::pin(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                settled(TaskName::RealWorldEvidence)
            }),
        ];

        let mut seen = Vec::new();
        let all = settle_all(futs, |t| seen.push(t.task)).await;

        // Completion order follows timing, not registration order.
        assert_eq!(
            seen,
            vec![TaskName::RealWorldEvidence, TaskName::AdverseEvents]
        );
        assert_eq!(all.len(), 2);
    }
}
