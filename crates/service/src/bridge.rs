//! Result bridge: callback-shaped sender, bounded blocking receiver
//!
//! One bridge per commit attempt. The service side holds the sink and
//! fires it exactly once when the install resolves; the orchestrator
//! takes the single payload with a bounded wait. A capacity-1 channel
//! gives the single-slot semantics directly.

use pkgrelay_errors::{Error, InstallError};
use pkgrelay_types::CommitOutcome;
use std::time::Duration;
use tokio::sync::mpsc;

/// Bound applied to both the sender's offer and the consumer's take.
pub const RESULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Callback-shaped completion sink handed to `Session::commit`.
///
/// Cloneable so service implementations can move it into whatever task
/// eventually resolves the install.
#[derive(Debug, Clone)]
pub struct ResultSink {
    tx: mpsc::Sender<CommitOutcome>,
}

impl ResultSink {
    /// Deliver the completion payload.
    ///
    /// Offers into the slot with a bounded wait; if the slot is already
    /// occupied or the consumer is gone past the bound, the payload is
    /// dropped rather than blocking the deliverer indefinitely.
    pub async fn offer(&self, outcome: CommitOutcome) {
        let _ = self.tx.send_timeout(outcome, RESULT_TIMEOUT).await;
    }
}

/// Consumer half of the bridge.
#[derive(Debug)]
pub struct ResultBridge {
    rx: mpsc::Receiver<CommitOutcome>,
}

impl ResultBridge {
    /// Create a fresh bridge pair.
    #[must_use]
    pub fn new() -> (ResultSink, ResultBridge) {
        let (tx, rx) = mpsc::channel(1);
        (ResultSink { tx }, ResultBridge { rx })
    }

    /// Take the single payload, waiting at most `RESULT_TIMEOUT`.
    ///
    /// Consumes the bridge: a second take cannot be issued.
    ///
    /// # Errors
    ///
    /// `InstallError::CommitTimeout` when no payload arrives within the
    /// bound; an internal error when every sink was dropped without
    /// delivering (the wait was interrupted, which is fatal).
    pub async fn take(mut self) -> Result<CommitOutcome, Error> {
        match tokio::time::timeout(RESULT_TIMEOUT, self.rx.recv()).await {
            Ok(Some(outcome)) => Ok(outcome),
            Ok(None) => Err(Error::internal(
                "result bridge interrupted: sink dropped without a payload",
            )),
            Err(_) => Err(InstallError::CommitTimeout {
                seconds: RESULT_TIMEOUT.as_secs(),
            }
            .into()),
        }
    }
}
