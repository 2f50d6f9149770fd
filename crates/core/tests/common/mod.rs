#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use recapper_core::{
    error::{
        AcquisitionError, ConversionError, SentimentError, StoreError, SummarizationError,
        TranscriptionError,
    },
    job::{JobId, JobRecord, StatusUpdate},
    pipeline::Stages,
    sentiment::SentimentAnalyzer,
    stages::{
        AudioArtifact, AudioNormalizer, AudioSource, JobWorkspace, Summarizer, SummaryRequest,
        Transcriber,
    },
    store::{JobStore, MemoryJobStore, StatusSink},
    types::{SentimentScores, TimestampedSegment, Transcript},
};

pub fn scenario_a_segments() -> Vec<TimestampedSegment> {
    vec![
        TimestampedSegment::new(0, 14, "Wow, what an audience."),
        TimestampedSegment::new(14, 18, "...my talk."),
        TimestampedSegment::new(18, 19, "I don't."),
    ]
}

#[derive(Default)]
pub struct FakeSource {
    pub calls: AtomicUsize,
    pub workspaces: Mutex<Vec<PathBuf>>,
    pub unreachable: bool,
}

#[async_trait]
impl AudioSource for FakeSource {
    async fn acquire(
        &self,
        reference: &str,
        workspace: &JobWorkspace,
    ) -> Result<AudioArtifact, AcquisitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.workspaces
            .lock()
            .unwrap()
            .push(workspace.path().to_path_buf());

        let path = workspace.file("source.webm");
        std::fs::write(&path, b"fake audio")?;

        if self.unreachable {
            return Err(AcquisitionError::InvalidReference {
                reference: reference.to_string(),
                reason: "Unsupported URL".into(),
            });
        }
        Ok(AudioArtifact::new(path))
    }
}

#[derive(Default)]
pub struct FakeNormalizer {
    pub calls: AtomicUsize,
    pub fail: bool,
}

#[async_trait]
impl AudioNormalizer for FakeNormalizer {
    async fn normalize(
        &self,
        input: &AudioArtifact,
        workspace: &JobWorkspace,
    ) -> Result<AudioArtifact, ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ConversionError::Failed {
                input: input.path.clone(),
                reason: "Invalid data found when processing input".into(),
            });
        }
        let path = workspace.file("audio.wav");
        std::fs::write(&path, b"RIFF")?;
        Ok(AudioArtifact::new(path))
    }
}

pub struct FakeTranscriber {
    pub calls: AtomicUsize,
    pub segments: Vec<TimestampedSegment>,
    pub delay: Option<Duration>,
}

impl FakeTranscriber {
    pub fn new(segments: Vec<TimestampedSegment>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            segments,
            delay: None,
        }
    }

    pub fn slow(segments: Vec<TimestampedSegment>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(segments)
        }
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, audio: &AudioArtifact) -> Result<Transcript, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(audio.path.exists(), "audio should live in the workspace");
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let text = self
            .segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(Transcript {
            text,
            segments: self.segments.clone(),
            language: "en".into(),
        })
    }
}

/// Scores every text by whether it contains "don't".
pub struct FixedSentiment;

impl SentimentAnalyzer for FixedSentiment {
    fn polarity(&self, text: &str) -> Result<SentimentScores, SentimentError> {
        let compound = if text.contains("don't") { -0.3 } else { 0.4 };
        Ok(SentimentScores {
            compound,
            ..Default::default()
        })
    }
}

pub struct FailingSentiment;

impl SentimentAnalyzer for FailingSentiment {
    fn polarity(&self, _text: &str) -> Result<SentimentScores, SentimentError> {
        Err(SentimentError::Failed("lexicon unavailable".into()))
    }
}

#[derive(Default)]
pub struct FakeSummarizer {
    pub calls: AtomicUsize,
    pub too_large: bool,
    pub requests: Mutex<Vec<SummaryRequest>>,
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(
        &self,
        transcript: &str,
        request: &SummaryRequest,
    ) -> Result<String, SummarizationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if self.too_large {
            return Err(SummarizationError::InputTooLarge {
                reason: format!("{} characters", transcript.len()),
            });
        }
        Ok(format!(
            "Summary in {} sentences.",
            request.summary_sentence_count
        ))
    }
}

pub struct Fakes {
    pub source: Arc<FakeSource>,
    pub normalizer: Arc<FakeNormalizer>,
    pub transcriber: Arc<FakeTranscriber>,
    pub summarizer: Arc<FakeSummarizer>,
}

impl Fakes {
    pub fn new(transcriber: FakeTranscriber) -> Self {
        Self {
            source: Arc::new(FakeSource::default()),
            normalizer: Arc::new(FakeNormalizer::default()),
            transcriber: Arc::new(transcriber),
            summarizer: Arc::new(FakeSummarizer::default()),
        }
    }

    pub fn stages(&self) -> Stages {
        Stages {
            source: self.source.clone(),
            normalizer: self.normalizer.clone(),
            transcriber: self.transcriber.clone(),
            sentiment: Arc::new(FixedSentiment),
            summarizer: self.summarizer.clone(),
        }
    }
}

/// Store that remembers the status text after every accepted write.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryJobStore,
    pub history: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusSink for RecordingStore {
    async fn record(&self, job_id: &JobId, update: StatusUpdate) -> Result<(), StoreError> {
        self.inner.record(job_id, update).await?;
        if let Some(record) = self.inner.get(job_id).await {
            self.history.lock().unwrap().push(record.status);
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for RecordingStore {
    async fn insert(&self, record: JobRecord) -> Result<(), StoreError> {
        self.inner.insert(record).await
    }

    async fn get(&self, job_id: &JobId) -> Option<JobRecord> {
        self.inner.get(job_id).await
    }

    async fn remove(&self, job_id: &JobId) -> Option<JobRecord> {
        self.inner.remove(job_id).await
    }
}
