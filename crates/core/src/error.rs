use std::{fmt, path::PathBuf};

use serde::Serialize;
use thiserror::Error;

pub const INVALID_LINK_MESSAGE: &str =
    "The provided video link is invalid. Please check the link and try again.";
pub const DOWNLOAD_FAILED_MESSAGE: &str = "An error occurred while downloading the video.";
pub const CONVERSION_FAILED_MESSAGE: &str = "An error occurred while converting audio.";
pub const TRANSCRIPTION_FAILED_MESSAGE: &str = "An error occurred while transcribing audio.";
pub const SENTIMENT_FAILED_MESSAGE: &str = "An error occurred while analyzing sentiment.";
pub const SUMMARY_FAILED_MESSAGE: &str = "An error occurred while summarizing the transcript.";
pub const INPUT_TOO_LARGE_MESSAGE: &str = "An error occurred while summarizing the video: \
Maximum word count exceeded. Support for unlimited video length is coming in a later update, \
but in the meantime please try analyzing a shorter video. Sorry for the inconvenience.";
pub const TIMED_OUT_MESSAGE: &str = "Processing timed out. Please try a shorter video.";

#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Invalid video reference {reference}: {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("Download failed for {reference}: {reason}")]
    Unavailable { reference: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Audio conversion failed for {input}: {reason}")]
    Failed { input: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("Model download failed from {url}: {reason}")]
    ModelDownloadFailed { url: String, reason: String },

    #[error("Failed to load whisper model {model_path}: {reason}")]
    ModelLoad { model_path: PathBuf, reason: String },

    #[error("Failed to read audio {audio_path}: {reason}")]
    AudioRead { audio_path: PathBuf, reason: String },

    #[error("Whisper inference failed: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SummarizationError {
    #[error("Transcript exceeds the summarizer input limit: {reason}")]
    InputTooLarge { reason: String },

    #[error("Summarization failed: {reason}")]
    Failed { reason: String },

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("Sentiment scoring failed: {0}")]
    Failed(String),
}

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Acquire,
    Convert,
    Transcribe,
    Sentiment,
    Summarize,
    Timeout,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Acquire => "acquire",
            Stage::Convert => "convert",
            Stage::Transcribe => "transcribe",
            Stage::Sentiment => "sentiment",
            Stage::Summarize => "summarize",
            Stage::Timeout => "timeout",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any stage failure, tagged by the stage that raised it.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error(transparent)]
    Sentiment(#[from] SentimentError),

    #[error(transparent)]
    Summarization(#[from] SummarizationError),
}

impl StageError {
    pub fn stage(&self) -> Stage {
        match self {
            StageError::Acquisition(_) => Stage::Acquire,
            StageError::Conversion(_) => Stage::Convert,
            StageError::Transcription(_) => Stage::Transcribe,
            StageError::Sentiment(_) => Stage::Sentiment,
            StageError::Summarization(_) => Stage::Summarize,
        }
    }

    /// Stable text shown to the user. Never includes the underlying error.
    pub fn user_message(&self) -> &'static str {
        match self {
            StageError::Acquisition(AcquisitionError::InvalidReference { .. }) => {
                INVALID_LINK_MESSAGE
            }
            StageError::Acquisition(_) => DOWNLOAD_FAILED_MESSAGE,
            StageError::Conversion(_) => CONVERSION_FAILED_MESSAGE,
            StageError::Transcription(_) => TRANSCRIPTION_FAILED_MESSAGE,
            StageError::Sentiment(_) => SENTIMENT_FAILED_MESSAGE,
            StageError::Summarization(SummarizationError::InputTooLarge { .. }) => {
                INPUT_TOO_LARGE_MESSAGE
            }
            StageError::Summarization(_) => SUMMARY_FAILED_MESSAGE,
        }
    }
}

/// Aggregate failure of a job run.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{stage} stage failed: {message}")]
pub struct PipelineFailed {
    pub stage: Stage,
    pub message: String,
}

impl PipelineFailed {
    pub fn timed_out() -> Self {
        Self {
            stage: Stage::Timeout,
            message: TIMED_OUT_MESSAGE.to_string(),
        }
    }
}

impl From<&StageError> for PipelineFailed {
    fn from(err: &StageError) -> Self {
        Self {
            stage: err.stage(),
            message: err.user_message().to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Invalid job parameters: {0}")]
    InvalidParams(String),

    #[error("Job queue is closed")]
    QueueClosed,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job {job_id} already exists")]
    Duplicate { job_id: String },

    #[error("Invalid transition for job {job_id}: {from} -> {to}")]
    InvalidTransition {
        job_id: String,
        from: &'static str,
        to: &'static str,
    },
}
