use tokio::sync::mpsc;

use super::{DispatchJob, DispatchReport, FailurePolicy, JobState};
use crate::email_client::MailTransport;

/// Consumer side of the dispatch queue. There is exactly one per queue.
pub struct DispatchWorker {
    receiver: mpsc::Receiver<DispatchJob>,
}

impl DispatchWorker {
    pub(super) fn new(receiver: mpsc::Receiver<DispatchJob>) -> Self {
        Self { receiver }
    }

    /// Executes jobs in enqueue order until every [`DispatchQueue`] handle has
    /// been dropped.
    ///
    /// [`DispatchQueue`]: super::DispatchQueue
    pub async fn run_until_stopped<T>(
        mut self,
        transport: T,
        policy: FailurePolicy,
    ) -> anyhow::Result<()>
    where
        T: MailTransport,
    {
        while let Some(job) = self.receiver.recv().await {
            let report = job.execute(&transport, policy).await;
            log_report(&report);
        }
        tracing::info!("dispatch queue closed, stopping the worker");
        Ok(())
    }

    /// Takes the next queued job without waiting, if there is one.
    pub fn try_next(&mut self) -> Option<DispatchJob> {
        self.receiver.try_recv().ok()
    }
}

fn log_report(report: &DispatchReport) {
    match report.state {
        JobState::Completed if report.failures.is_empty() => tracing::info!(
            job = report.sequence,
            delivered = report.delivered,
            "dispatch job completed"
        ),
        JobState::Completed => tracing::warn!(
            job = report.sequence,
            delivered = report.delivered,
            failed = report.failures.len(),
            "dispatch job completed with failed deliveries"
        ),
        _ => tracing::error!(
            job = report.sequence,
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failures.len(),
            aborted = report.aborted,
            "dispatch job failed"
        ),
    }
}
