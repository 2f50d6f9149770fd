//! Job status storage.
//!
//! `StatusSink` is the only thing the orchestrator writes to. `JobStore` adds
//! the submit and poll side. `MemoryJobStore` keeps everything in process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::StoreError,
    job::{JobId, JobRecord, JobSnapshot, StatusUpdate},
};

#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn record(&self, job_id: &JobId, update: StatusUpdate) -> Result<(), StoreError>;
}

#[async_trait]
pub trait JobStore: StatusSink {
    async fn insert(&self, record: JobRecord) -> Result<(), StoreError>;

    async fn get(&self, job_id: &JobId) -> Option<JobRecord>;

    /// Drop a record that was never handed to a worker.
    async fn remove(&self, job_id: &JobId) -> Option<JobRecord>;

    async fn snapshot(&self, job_id: &JobId) -> Option<JobSnapshot> {
        self.get(job_id).await.map(|r| r.snapshot())
    }
}

#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl StatusSink for MemoryJobStore {
    async fn record(&self, job_id: &JobId, update: StatusUpdate) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let record = jobs
            .get_mut(job_id)
            .ok_or_else(|| StoreError::JobNotFound(job_id.to_string()))?;

        let from = record.state;
        let to = update.target_state();
        if !record.apply(update) {
            return Err(StoreError::InvalidTransition {
                job_id: job_id.to_string(),
                from: from.as_str(),
                to: to.as_str(),
            });
        }

        tracing::debug!(job_id = %job_id, state = %record.state, status = %record.status, "job status updated");
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, record: JobRecord) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&record.id) {
            return Err(StoreError::Duplicate {
                job_id: record.id.to_string(),
            });
        }
        jobs.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, job_id: &JobId) -> Option<JobRecord> {
        self.jobs.read().await.get(job_id).cloned()
    }

    async fn remove(&self, job_id: &JobId) -> Option<JobRecord> {
        self.jobs.write().await.remove(job_id)
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::job::{Job, JobParams, JobState, STATUS_TRANSCRIBING};

    fn job() -> Job {
        Job {
            id: JobId::new(),
            params: JobParams {
                video_reference: "https://youtu.be/abc".into(),
                summary_sentence_count: 3,
                keywords: vec!["rust".into()],
                per_keyword_sentence_count: 1,
            },
        }
    }

    #[tokio::test]
    async fn records_progress_and_terminal_outcome_once() {
        let store = MemoryJobStore::new();
        let job = job();
        assert_ok!(store.insert(JobRecord::pending(&job)).await);

        assert!(matches!(
            store.record(&job.id, StatusUpdate::Failed("early".into())).await,
            Err(StoreError::InvalidTransition { from: "pending", to: "failed", .. })
        ));
        assert_ok!(store.record(&job.id, StatusUpdate::Started).await);
        assert_ok!(
            store
                .record(&job.id, StatusUpdate::Progress(STATUS_TRANSCRIBING))
                .await
        );
        let snapshot = store.snapshot(&job.id).await.unwrap();
        assert_eq!(snapshot.state, JobState::Running);
        assert_eq!(snapshot.status, STATUS_TRANSCRIBING);

        assert_ok!(store.record(&job.id, StatusUpdate::Failed("nope".into())).await);
        assert_err!(
            store
                .record(&job.id, StatusUpdate::Succeeded(Box::default()))
                .await
        );

        let snapshot = store.snapshot(&job.id).await.unwrap();
        assert_eq!(snapshot.state, JobState::Failed);
        assert_eq!(snapshot.error.as_deref(), Some("nope"));
        assert!(snapshot.result.is_none());
    }

    #[tokio::test]
    async fn unknown_and_duplicate_jobs_are_rejected() {
        let store = MemoryJobStore::new();
        let job = job();

        assert!(matches!(
            store.record(&job.id, StatusUpdate::Started).await,
            Err(StoreError::JobNotFound(_))
        ));
        assert_ok!(store.insert(JobRecord::pending(&job)).await);
        assert!(matches!(
            store.insert(JobRecord::pending(&job)).await,
            Err(StoreError::Duplicate { .. })
        ));
        assert_eq!(store.len().await, 1);
        assert!(store.snapshot(&JobId::new()).await.is_none());

        assert_eq!(store.remove(&job.id).await.map(|r| r.id), Some(job.id));
        assert!(store.is_empty().await);
        assert!(store.remove(&job.id).await.is_none());
    }
}
