use std::sync::Arc;

use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    cache::get_jobs_dir,
    config::WorkerConfig,
    pipeline::{Pipeline, Stages},
    queues::job_queue,
    service::JobService,
    store::{JobStore, StatusSink},
    workers::JobWorker,
};

/// A running service: the submission front door plus its worker tasks.
pub struct ServiceHandle<S> {
    service: Arc<JobService<S>>,
    shutdown_tx: broadcast::Sender<()>,
    workers: Vec<JoinHandle<()>>,
}

/// Wire a store, a queue and `config.worker_count` workers together.
pub fn start_service<S>(store: Arc<S>, stages: Stages, config: &WorkerConfig) -> ServiceHandle<S>
where
    S: JobStore + 'static,
{
    let pipeline = Arc::new(Pipeline::new(stages, get_jobs_dir(&config.cache_dir)));
    let (queue, receiver) = job_queue(config.queue_capacity);
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let sink: Arc<dyn StatusSink> = store.clone();

    let worker_count = config.worker_count.max(1);
    let workers = (0..worker_count)
        .map(|id| {
            let worker = JobWorker::new(
                id,
                Arc::clone(&pipeline),
                Arc::clone(&sink),
                config.job_timeout,
            );
            tokio::spawn(worker.run(receiver.clone(), shutdown_tx.subscribe()))
        })
        .collect();

    info!(
        workers = worker_count,
        queue_capacity = config.queue_capacity,
        timeout_secs = config.job_timeout.as_secs(),
        "job service started"
    );

    ServiceHandle {
        service: Arc::new(JobService::new(store, queue)),
        shutdown_tx,
        workers,
    }
}

impl<S: JobStore + 'static> ServiceHandle<S> {
    pub fn service(&self) -> Arc<JobService<S>> {
        Arc::clone(&self.service)
    }

    /// Stop accepting work and wait for every worker to finish its current job.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        for worker in self.workers {
            if let Err(e) = worker.await {
                warn!("worker task ended abnormally: {e}");
            }
        }
        info!("job service stopped");
    }
}
