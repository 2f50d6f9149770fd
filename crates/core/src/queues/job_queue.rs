use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::{error::SubmitError, job::Job};

/// Sending half of the job queue. Cheap to clone.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<Job>,
}

/// Receiving half, shared by every worker. Each job is delivered to exactly one
/// caller of [`JobReceiver::claim`].
#[derive(Clone)]
pub struct JobReceiver {
    rx: Arc<Mutex<mpsc::Receiver<Job>>>,
}

pub fn job_queue(capacity: usize) -> (JobQueue, JobReceiver) {
    let (tx, rx) = mpsc::channel::<Job>(capacity.max(1));
    (
        JobQueue { tx },
        JobReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

impl JobQueue {
    pub async fn enqueue(&self, job: Job) -> Result<(), SubmitError> {
        self.tx.send(job).await.map_err(|_| SubmitError::QueueClosed)
    }
}

impl JobReceiver {
    /// Wait for the next job. `None` once every sender is gone and the queue is
    /// drained.
    pub async fn claim(&self) -> Option<Job> {
        self.rx.lock().await.recv().await
    }
}
