//! Fire-and-forget delivery of sampled batches.
//!
//! The trigger hands a [`RecipientBatch`](crate::domain::RecipientBatch) to a
//! [`DispatchQueue`] and returns straight away. A single [`DispatchWorker`]
//! drains the queue in enqueue order and sends one message per recipient.

mod job;
mod queue;
mod worker;

pub use job::{DeliveryFailure, DispatchJob, DispatchReport, FailedDelivery, JobState};
pub use queue::{DispatchQueue, QueueError, channel};
pub use worker::DispatchWorker;

/// What a job does when a single recipient cannot be reached.
#[derive(serde::Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure and carry on with the rest of the batch.
    #[default]
    Isolate,
    /// Stop the job at the first failure, the remaining recipients are skipped.
    AbortOnFailure,
}
