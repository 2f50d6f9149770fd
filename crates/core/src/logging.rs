//! Structured job logging.

use tracing::{Span, error, info, warn};

use crate::{error::Stage, job::JobId};

/// Logs job lifecycle events with the job id attached to every line.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
}

impl JobLogger {
    pub fn new(job_id: &JobId) -> Self {
        Self {
            job_id: job_id.to_string(),
        }
    }

    pub fn log_start(&self, reference: &str) {
        info!(job_id = %self.job_id, reference = %reference, "Job started");
    }

    pub fn log_stage(&self, stage: Stage) {
        info!(job_id = %self.job_id, stage = %stage, "Stage started");
    }

    pub fn log_warning(&self, message: &str) {
        warn!(job_id = %self.job_id, "Job warning: {}", message);
    }

    /// Technical detail of a failure. This is the only place it surfaces.
    pub fn log_failure(&self, stage: Stage, detail: &dyn std::error::Error) {
        error!(job_id = %self.job_id, stage = %stage, "Job failed: {}", detail);
    }

    pub fn log_completion(&self, chunks: usize) {
        info!(job_id = %self.job_id, chunks, "Job completed");
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn create_span(&self) -> Span {
        tracing::info_span!("job", job_id = %self.job_id)
    }
}
