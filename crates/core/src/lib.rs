pub mod cache;
pub mod chunker;
pub mod config;
pub mod error;
pub mod format;
pub mod job;
pub mod logging;
pub mod pipeline;
pub mod provider;
pub mod queues;
pub mod sentiment;
pub mod service;
pub mod stages;
pub mod store;
pub mod types;
pub mod workers;

pub use cache::{get_jobs_dir, get_model_dir, get_root_cache_dir};
pub use chunker::build_context_chunks;
pub use config::WorkerConfig;
pub use error::{PipelineFailed, Stage, StageError, StoreError, SubmitError};
pub use format::{format_segments, format_summary_readable, format_timestamp};
pub use job::{JobId, JobRequest, JobSnapshot, JobState};
pub use pipeline::{JobHandle, Pipeline, Stages};
pub use provider::{Provider, ProviderConfig};
pub use sentiment::{SentimentAnalyzer, VaderAnalyzer};
pub use service::JobService;
pub use store::{JobStore, MemoryJobStore, StatusSink};
pub use types::{ContextChunk, SentimentRecord, SentimentScores, SummaryResult, TimestampedSegment, Transcript};
pub use workers::{JobWorker, ServiceHandle, start_service};
