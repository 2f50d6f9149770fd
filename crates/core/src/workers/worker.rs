use std::{sync::Arc, time::Duration};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::{
    error::{PipelineFailed, StoreError},
    job::{Job, JobId, JobState, StatusUpdate},
    pipeline::Pipeline,
    queues::JobReceiver,
    store::StatusSink,
    types::SummaryResult,
};

/// Pulls jobs off the shared queue and runs them one at a time.
pub struct JobWorker {
    id: usize,
    pipeline: Arc<Pipeline>,
    sink: Arc<dyn StatusSink>,
    job_timeout: Duration,
}

impl JobWorker {
    pub fn new(
        id: usize,
        pipeline: Arc<Pipeline>,
        sink: Arc<dyn StatusSink>,
        job_timeout: Duration,
    ) -> Self {
        Self {
            id,
            pipeline,
            sink,
            job_timeout,
        }
    }

    /// Runs until shutdown is signalled or the queue is closed and drained. A
    /// job in flight is always finished before shutdown is honoured.
    pub async fn run(self, receiver: JobReceiver, mut shutdown: broadcast::Receiver<()>) {
        debug!(worker = self.id, "worker started");
        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                job = receiver.claim() => match job {
                    Some(job) => {
                        let _ = self.process(job).await;
                    }
                    None => break,
                },
            }
        }
        debug!(worker = self.id, "worker stopped");
    }

    /// Run one job under the job timeout. On expiry the pipeline future is
    /// dropped, which removes its workspace, and the job is marked failed.
    pub async fn process(&self, job: Job) -> Result<SummaryResult, PipelineFailed> {
        let job_id = job.id;
        let run = self.pipeline.run(job, Arc::clone(&self.sink));

        match tokio::time::timeout(self.job_timeout, run).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(worker = self.id, job_id = %job_id, timeout_secs = self.job_timeout.as_secs(), "job timed out");
                let failed = PipelineFailed::timed_out();
                if let Err(e) = self.record_timeout(&job_id, &failed).await {
                    warn!(job_id = %job_id, "status write rejected: {e}");
                }
                Err(failed)
            }
        }
    }

    /// A run can expire before its first status write landed. The job is
    /// moved to running first in that case so it never skips a state.
    async fn record_timeout(&self, job_id: &JobId, failed: &PipelineFailed) -> Result<(), StoreError> {
        let update = || StatusUpdate::Failed(failed.message.clone());
        match self.sink.record(job_id, update()).await {
            Err(StoreError::InvalidTransition { from, .. }) if from == JobState::Pending.as_str() => {
                self.sink.record(job_id, StatusUpdate::Started).await?;
                self.sink.record(job_id, update()).await
            }
            other => other,
        }
    }
}
