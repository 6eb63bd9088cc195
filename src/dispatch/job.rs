use chrono::{Datelike, Utc};

use super::FailurePolicy;
use crate::domain::{OutboundMessage, RecipientBatch, RecipientRecord, RenderError};
use crate::email_client::{MailTransport, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Failed,
}

/// A queued unit of work owning a snapshot of one batch.
///
/// The only identity a job has is its enqueue sequence number, nothing is
/// deduplicated.
#[derive(Debug)]
pub struct DispatchJob {
    sequence: u64,
    batch: RecipientBatch,
    state: JobState,
}

#[derive(thiserror::Error, Debug)]
pub enum DeliveryFailure {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug)]
pub struct FailedDelivery {
    pub email: String,
    pub error: DeliveryFailure,
}

#[derive(Debug)]
pub struct DispatchReport {
    pub sequence: u64,
    pub state: JobState,
    pub attempted: usize,
    pub delivered: usize,
    pub failures: Vec<FailedDelivery>,
    pub aborted: bool,
}

impl DispatchJob {
    pub fn new(sequence: u64, batch: RecipientBatch) -> Self {
        Self {
            sequence,
            batch,
            state: JobState::Queued,
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn batch(&self) -> &RecipientBatch {
        &self.batch
    }

    /// Runs the job to completion. Recipients are handled one after the other,
    /// and consuming `self` guarantees a job is only ever run once.
    #[tracing::instrument(
        name = "Executing a dispatch job",
        skip(self, transport),
        fields(job = self.sequence, recipients = self.batch.len())
    )]
    pub async fn execute<T>(mut self, transport: &T, policy: FailurePolicy) -> DispatchReport
    where
        T: MailTransport + ?Sized,
    {
        self.transition(JobState::Running);
        let year = Utc::now().year();

        let mut attempted = 0;
        let mut delivered = 0;
        let mut failures = Vec::new();
        let mut aborted = false;

        for record in &self.batch {
            attempted += 1;
            match deliver(transport, record, year).await {
                Ok(()) => delivered += 1,
                Err(error) => {
                    tracing::error!(
                        error.cause_chain = ?error,
                        error.message = %error,
                        recipient = %record.email,
                        recipient_id = ?record.id,
                        "Failed to deliver the welcome email"
                    );
                    failures.push(FailedDelivery {
                        email: record.email.clone(),
                        error,
                    });
                    if policy == FailurePolicy::AbortOnFailure {
                        aborted = true;
                        break;
                    }
                }
            }
        }

        let failed = aborted || (attempted > 0 && delivered == 0);
        self.transition(if failed {
            JobState::Failed
        } else {
            JobState::Completed
        });

        DispatchReport {
            sequence: self.sequence,
            state: self.state,
            attempted,
            delivered,
            failures,
            aborted,
        }
    }

    fn transition(&mut self, next: JobState) {
        tracing::debug!(job = self.sequence, from = ?self.state, to = ?next, "job state change");
        self.state = next;
    }
}

async fn deliver<T>(
    transport: &T,
    record: &RecipientRecord,
    year: i32,
) -> Result<(), DeliveryFailure>
where
    T: MailTransport + ?Sized,
{
    let message = OutboundMessage::welcome(record, year)?;
    transport.send(&message).await?;
    Ok(())
}
