use tokio::sync::watch;

/// Create a linked cancellation pair for one orchestration invocation.
///
/// The handle side belongs to whoever supersedes the invocation (e.g. the
/// consumer reacting to a drug-selection change); the token side is cloned
/// into every in-flight task future.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // Receivers may already be gone when the run finished first.
        let _ = self.tx.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the invocation is cancelled. If the handle is dropped
    /// without cancelling, this never resolves; the task side then settles
    /// on its own call (or its timeout).
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
