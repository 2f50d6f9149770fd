//! The four external stages of a job and the scratch space they share.

pub mod acquire;
pub mod normalize;
pub mod summarize;
pub mod transcribe;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::{
    error::{AcquisitionError, ConversionError, SummarizationError, TranscriptionError},
    types::Transcript,
};

pub use acquire::YtDlpSource;
pub use normalize::FfmpegNormalizer;
pub use summarize::{ChatSummarizer, SummaryRequest};
pub use transcribe::WhisperTranscriber;

/// An audio file living inside a [`JobWorkspace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub path: PathBuf,
}

impl AudioArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Per-job scratch directory. Everything a stage writes goes in here and is
/// removed together when the workspace is closed or dropped.
#[derive(Debug)]
pub struct JobWorkspace {
    dir: TempDir,
}

impl JobWorkspace {
    /// Create a fresh directory under `root`.
    pub fn create(root: &Path, prefix: &str) -> std::io::Result<Self> {
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new().prefix(prefix).tempdir_in(root)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Delete the directory now and report any error. Dropping the workspace
    /// deletes it too, silently.
    pub fn close(self) -> std::io::Result<()> {
        self.dir.close()
    }
}

#[async_trait]
pub trait AudioSource: Send + Sync {
    async fn acquire(
        &self,
        reference: &str,
        workspace: &JobWorkspace,
    ) -> Result<AudioArtifact, AcquisitionError>;
}

#[async_trait]
pub trait AudioNormalizer: Send + Sync {
    /// Produce a mono 16 kHz 16-bit PCM WAV file.
    async fn normalize(
        &self,
        input: &AudioArtifact,
        workspace: &JobWorkspace,
    ) -> Result<AudioArtifact, ConversionError>;
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &AudioArtifact) -> Result<Transcript, TranscriptionError>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        transcript: &str,
        request: &SummaryRequest,
    ) -> Result<String, SummarizationError>;
}
