use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::{self, error::TrySendError};

use super::{DispatchJob, DispatchWorker};
use crate::domain::RecipientBatch;

/// Creates a bounded dispatch queue and the single worker that drains it.
pub fn channel(capacity: usize) -> (DispatchQueue, DispatchWorker) {
    // tokio panics on a zero capacity channel
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let queue = DispatchQueue {
        sender,
        next_sequence: Arc::new(AtomicU64::new(0)),
    };
    (queue, DispatchWorker::new(receiver))
}

/// Producer side of the dispatch queue. Cloning is cheap, every clone feeds
/// the same worker.
#[derive(Clone)]
pub struct DispatchQueue {
    sender: mpsc::Sender<DispatchJob>,
    next_sequence: Arc<AtomicU64>,
}

impl DispatchQueue {
    /// Accepts `batch` for later delivery and returns the job's sequence
    /// number. Never waits on the worker.
    #[tracing::instrument(
        name = "Enqueuing a dispatch job",
        skip(self, batch),
        fields(recipients = batch.len())
    )]
    pub fn enqueue(&self, batch: RecipientBatch) -> Result<u64, QueueError> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        self.sender
            .try_send(DispatchJob::new(sequence, batch))
            .map_err(|e| match e {
                TrySendError::Full(_) => QueueError::Full,
                TrySendError::Closed(_) => QueueError::Closed,
            })?;
        tracing::info!(job = sequence, "dispatch job queued");
        Ok(sequence)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum QueueError {
    #[error("the dispatch queue is full")]
    Full,
    #[error("the dispatch worker has stopped")]
    Closed,
}
