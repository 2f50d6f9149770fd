//! Job orchestration: runs the stages of one job in order and keeps the status
//! store informed.

use std::{path::PathBuf, sync::Arc};

use tracing::Instrument;

use crate::{
    chunker::build_context_chunks,
    error::{AcquisitionError, PipelineFailed, Stage, StageError},
    job::{
        Job, JobId, JobParams, STATUS_CONVERTING, STATUS_SENTIMENT, STATUS_SUMMARIZING,
        STATUS_TRANSCRIBING, StatusUpdate,
    },
    logging::JobLogger,
    sentiment::{self, SentimentAnalyzer},
    stages::{
        AudioNormalizer, AudioSource, JobWorkspace, Summarizer, SummaryRequest, Transcriber,
    },
    store::StatusSink,
    types::SummaryResult,
};

const WORKSPACE_PREFIX: &str = "job-";

/// The collaborators a pipeline drives.
#[derive(Clone)]
pub struct Stages {
    pub source: Arc<dyn AudioSource>,
    pub normalizer: Arc<dyn AudioNormalizer>,
    pub transcriber: Arc<dyn Transcriber>,
    pub sentiment: Arc<dyn SentimentAnalyzer>,
    pub summarizer: Arc<dyn Summarizer>,
}

/// Sole writer of one job's status while it runs.
///
/// Not `Clone`. The terminal writes consume the handle, so a run records at
/// most one outcome.
pub struct JobHandle {
    job_id: JobId,
    sink: Arc<dyn StatusSink>,
    logger: JobLogger,
}

impl JobHandle {
    pub fn new(job_id: JobId, sink: Arc<dyn StatusSink>) -> Self {
        Self {
            job_id,
            sink,
            logger: JobLogger::new(&job_id),
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    async fn write(&self, update: StatusUpdate) {
        if let Err(e) = self.sink.record(&self.job_id, update).await {
            self.logger.log_warning(&format!("status write rejected: {e}"));
        }
    }

    pub async fn start(&self) {
        self.write(StatusUpdate::Started).await;
    }

    pub async fn progress(&self, label: &'static str) {
        self.write(StatusUpdate::Progress(label)).await;
    }

    pub async fn succeed(self, result: SummaryResult) {
        self.write(StatusUpdate::Succeeded(Box::new(result))).await;
    }

    pub async fn fail(self, failure: &PipelineFailed) {
        self.write(StatusUpdate::Failed(failure.message.clone())).await;
    }
}

pub struct Pipeline {
    stages: Stages,
    workspace_root: PathBuf,
}

impl Pipeline {
    /// `workspace_root` is where per-job scratch directories are created.
    pub fn new(stages: Stages, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            stages,
            workspace_root: workspace_root.into(),
        }
    }

    /// Run one job start to finish. The first failing stage aborts the run;
    /// its user-facing message becomes the job's terminal status.
    pub async fn run(
        &self,
        job: Job,
        sink: Arc<dyn StatusSink>,
    ) -> Result<SummaryResult, PipelineFailed> {
        let logger = JobLogger::new(&job.id);
        let span = logger.create_span();

        async move {
            let handle = JobHandle::new(job.id, sink);
            logger.log_start(&job.params.video_reference);
            handle.start().await;

            match self.execute(&handle, &logger, &job.params).await {
                Ok(result) => {
                    logger.log_completion(result.transcript_filtered.len());
                    handle.succeed(result.clone()).await;
                    Ok(result)
                }
                Err(err) => {
                    logger.log_failure(err.stage(), &err);
                    let failed = PipelineFailed::from(&err);
                    handle.fail(&failed).await;
                    Err(failed)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// The workspace lives for the duration of this call. It is closed
    /// explicitly on success and dropped on every early return.
    async fn execute(
        &self,
        handle: &JobHandle,
        logger: &JobLogger,
        params: &JobParams,
    ) -> Result<SummaryResult, StageError> {
        let workspace = JobWorkspace::create(&self.workspace_root, WORKSPACE_PREFIX)
            .map_err(AcquisitionError::Io)?;

        logger.log_stage(Stage::Acquire);
        let downloaded = self
            .stages
            .source
            .acquire(&params.video_reference, &workspace)
            .await?;

        handle.progress(STATUS_CONVERTING).await;
        logger.log_stage(Stage::Convert);
        let audio = self
            .stages
            .normalizer
            .normalize(&downloaded, &workspace)
            .await?;

        handle.progress(STATUS_TRANSCRIBING).await;
        logger.log_stage(Stage::Transcribe);
        let transcript = self.stages.transcriber.transcribe(&audio).await?;
        let filtered = build_context_chunks(&transcript.segments, &params.keywords);

        handle.progress(STATUS_SENTIMENT).await;
        logger.log_stage(Stage::Sentiment);
        let sentiment_analysis = sentiment::score(self.stages.sentiment.as_ref(), &filtered)?;

        handle.progress(STATUS_SUMMARIZING).await;
        logger.log_stage(Stage::Summarize);
        let request = SummaryRequest {
            summary_sentence_count: params.summary_sentence_count,
            keywords: params.keywords.clone(),
            per_keyword_sentence_count: params.per_keyword_sentence_count,
        };
        let summary = self
            .stages
            .summarizer
            .summarize(&transcript.text, &request)
            .await?;

        if let Err(e) = workspace.close() {
            logger.log_warning(&format!("failed to remove job workspace: {e}"));
        }

        Ok(SummaryResult {
            transcript: transcript.text,
            transcript_timestamped: transcript.segments,
            transcript_filtered: filtered,
            sentiment_analysis,
            summary,
        })
    }
}
