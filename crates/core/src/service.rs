//! Submission and polling front door.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    error::SubmitError,
    job::{Job, JobId, JobParams, JobRecord, JobRequest, JobSnapshot},
    queues::JobQueue,
    store::JobStore,
};

pub struct JobService<S> {
    store: Arc<S>,
    queue: JobQueue,
}

impl<S: JobStore> JobService<S> {
    pub fn new(store: Arc<S>, queue: JobQueue) -> Self {
        Self { store, queue }
    }

    /// Validate, record as pending and enqueue. Returns as soon as the job is
    /// queued.
    pub async fn submit(&self, request: JobRequest) -> Result<JobId, SubmitError> {
        let params = JobParams::try_from(request)?;
        let job = Job {
            id: JobId::new(),
            params,
        };
        let job_id = job.id;

        self.store.insert(JobRecord::pending(&job)).await?;

        if let Err(e) = self.queue.enqueue(job).await {
            warn!(job_id = %job_id, "enqueue failed: {e}");
            self.store.remove(&job_id).await;
            return Err(e);
        }

        info!(job_id = %job_id, "job submitted");
        Ok(job_id)
    }

    /// Current state of a job. Never mutates anything.
    pub async fn status(&self, job_id: &JobId) -> Option<JobSnapshot> {
        self.store.snapshot(job_id).await
    }
}
