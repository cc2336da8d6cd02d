//! Background refund worker.
//!
//! Bulk refund resolution is offloaded to a dedicated task so a large batch
//! never runs on a request handler. The triggering request still needs the
//! outcome before it can respond, so submission is fire-and-wait: the
//! handler sends a command with a reply channel and blocks on it under a
//! configured timeout. Commands are processed one at a time, serializing
//! concurrent bulk runs.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use shop_core::RefundDecision;
use shop_engine::{BulkReport, SettlementEngine};

/// A bulk resolution command sent to the worker.
struct BulkCommand {
    decision: RefundDecision,
    reply: oneshot::Sender<Result<BulkReport, String>>,
}

/// Handle for submitting bulk resolutions to the refund worker.
#[derive(Clone)]
pub struct WorkerHandle {
    tx: mpsc::Sender<BulkCommand>,
}

/// Errors waiting on the refund worker.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The worker did not answer within the configured timeout. The job
    /// itself keeps running to completion in the background.
    #[error("bulk refund resolution timed out")]
    Timeout,

    /// The worker task is gone.
    #[error("refund worker unavailable")]
    Unavailable,

    /// The bulk run itself failed before processing any item.
    #[error("bulk refund resolution failed: {0}")]
    Failed(String),
}

impl WorkerHandle {
    /// Submit a bulk resolution and wait for its report.
    ///
    /// # Errors
    ///
    /// `WorkerError::Timeout` when the wait expires, `Unavailable` when the
    /// worker has stopped, `Failed` when the run errored up front.
    pub async fn resolve_all(
        &self,
        decision: RefundDecision,
        timeout: Duration,
    ) -> Result<BulkReport, WorkerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(BulkCommand {
                decision,
                reply: reply_tx,
            })
            .await
            .map_err(|_| WorkerError::Unavailable)?;

        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(Ok(report))) => Ok(report),
            Ok(Ok(Err(message))) => Err(WorkerError::Failed(message)),
            Ok(Err(_)) => Err(WorkerError::Unavailable),
            Err(_) => Err(WorkerError::Timeout),
        }
    }
}

/// Spawn the refund worker task and return a submission handle.
#[must_use]
pub fn spawn(engine: Arc<SettlementEngine>) -> WorkerHandle {
    let (tx, mut rx) = mpsc::channel::<BulkCommand>(16);

    tokio::spawn(async move {
        tracing::info!("Refund worker started");
        while let Some(command) = rx.recv().await {
            let engine = Arc::clone(&engine);
            let decision = command.decision;

            // The engine is synchronous; keep it off the async executor.
            let outcome = tokio::task::spawn_blocking(move || engine.resolve_all(decision)).await;

            let result = match outcome {
                Ok(Ok(report)) => Ok(report),
                Ok(Err(error)) => {
                    tracing::error!(%error, "Bulk refund run failed");
                    Err(error.to_string())
                }
                Err(join_error) => {
                    tracing::error!(%join_error, "Bulk refund task panicked");
                    Err(join_error.to_string())
                }
            };

            // The requester may have timed out and dropped the receiver.
            if command.reply.send(result).is_err() {
                tracing::warn!("Bulk refund requester went away before the report");
            }
        }
        tracing::info!("Refund worker stopped");
    });

    WorkerHandle { tx }
}
