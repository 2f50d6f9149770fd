//! Job identity, parameters and lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::SubmitError, types::SummaryResult};

pub const STATUS_QUEUED: &str = "Queued";
pub const STATUS_DOWNLOADING: &str = "Downloading audio...";
pub const STATUS_CONVERTING: &str = "Converting audio...";
pub const STATUS_TRANSCRIBING: &str = "Transcribing audio... This may take a while.";
pub const STATUS_SENTIMENT: &str = "Analyzing sentiment...";
pub const STATUS_SUMMARIZING: &str = "Summarizing transcript...";
pub const STATUS_COMPLETED: &str = "task completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Raw submission as received from a front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub video_reference: String,
    pub summary_sentence_count: u32,
    /// Comma-separated keyword list.
    pub keywords: String,
    pub per_keyword_sentence_count: u32,
}

/// Validated job parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParams {
    pub video_reference: String,
    pub summary_sentence_count: u32,
    pub keywords: Vec<String>,
    pub per_keyword_sentence_count: u32,
}

impl TryFrom<JobRequest> for JobParams {
    type Error = SubmitError;

    fn try_from(req: JobRequest) -> Result<Self, Self::Error> {
        let video_reference = req.video_reference.trim().to_string();
        if video_reference.is_empty() {
            return Err(SubmitError::InvalidParams(
                "video reference must not be empty".into(),
            ));
        }
        if req.summary_sentence_count == 0 {
            return Err(SubmitError::InvalidParams(
                "summary sentence count must be positive".into(),
            ));
        }
        if req.per_keyword_sentence_count == 0 {
            return Err(SubmitError::InvalidParams(
                "per-keyword sentence count must be positive".into(),
            ));
        }

        Ok(Self {
            video_reference,
            summary_sentence_count: req.summary_sentence_count,
            keywords: parse_keywords(&req.keywords),
            per_keyword_sentence_count: req.per_keyword_sentence_count,
        })
    }
}

/// Split a comma-separated list into an ordered set: trimmed, non-empty,
/// first occurrence wins.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for keyword in raw.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        if !keywords.iter().any(|k| k == keyword) {
            keywords.push(keyword.to_string());
        }
    }
    keywords
}

/// A unit of work travelling through the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub params: JobParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }

    /// `Pending -> Running -> (Succeeded | Failed)`. Running is never skipped.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Pending, JobState::Running)
                | (JobState::Running, JobState::Running)
                | (JobState::Running, JobState::Succeeded)
                | (JobState::Running, JobState::Failed)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A write the orchestrator sends to the status store.
#[derive(Debug, Clone)]
pub enum StatusUpdate {
    Started,
    Progress(&'static str),
    Succeeded(Box<SummaryResult>),
    Failed(String),
}

impl StatusUpdate {
    pub fn target_state(&self) -> JobState {
        match self {
            StatusUpdate::Started | StatusUpdate::Progress(_) => JobState::Running,
            StatusUpdate::Succeeded(_) => JobState::Succeeded,
            StatusUpdate::Failed(_) => JobState::Failed,
        }
    }
}

/// Stored view of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub params: JobParams,
    pub state: JobState,
    pub status: String,
    pub result: Option<SummaryResult>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn pending(job: &Job) -> Self {
        let now = Utc::now();
        Self {
            id: job.id,
            params: job.params.clone(),
            state: JobState::Pending,
            status: STATUS_QUEUED.to_string(),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update if the state machine allows it. Returns false and leaves
    /// the record untouched otherwise.
    pub fn apply(&mut self, update: StatusUpdate) -> bool {
        if !self.state.can_transition_to(update.target_state()) {
            return false;
        }

        match update {
            StatusUpdate::Started => {
                self.state = JobState::Running;
                self.status = STATUS_DOWNLOADING.to_string();
            }
            StatusUpdate::Progress(label) => {
                self.state = JobState::Running;
                self.status = label.to_string();
            }
            StatusUpdate::Succeeded(result) => {
                self.state = JobState::Succeeded;
                self.status = STATUS_COMPLETED.to_string();
                self.result = Some(*result);
            }
            StatusUpdate::Failed(message) => {
                self.state = JobState::Failed;
                self.status = message.clone();
                self.error = Some(message);
            }
        }
        self.updated_at = Utc::now();
        true
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            state: self.state,
            status: self.status.clone(),
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }
}

/// What a poller sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub state: JobState,
    pub status: String,
    pub result: Option<SummaryResult>,
    pub error: Option<String>,
}
