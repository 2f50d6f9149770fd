use async_trait::async_trait;
use tokio::process::Command;

use crate::{
    error::ConversionError,
    stages::{AudioArtifact, AudioNormalizer, JobWorkspace},
};

pub const SAMPLE_RATE: u32 = 16_000;
const NORMALIZED_FILE: &str = "audio.wav";

/// Converts any container ffmpeg understands into mono 16 kHz PCM WAV.
pub struct FfmpegNormalizer {
    binary: String,
}

impl Default for FfmpegNormalizer {
    fn default() -> Self {
        Self::with_binary("ffmpeg")
    }
}

impl FfmpegNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl AudioNormalizer for FfmpegNormalizer {
    async fn normalize(
        &self,
        input: &AudioArtifact,
        workspace: &JobWorkspace,
    ) -> Result<AudioArtifact, ConversionError> {
        let audio_path = workspace.file(NORMALIZED_FILE);
        let output = Command::new(&self.binary)
            .arg("-y")
            .arg("-i")
            .arg(&input.path)
            .arg("-vn")
            .arg("-acodec")
            .arg("pcm_s16le")
            .arg("-ar")
            .arg(SAMPLE_RATE.to_string())
            .arg("-ac")
            .arg("1")
            .arg(&audio_path)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ConversionError::Failed {
                input: input.path.clone(),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(AudioArtifact::new(audio_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_a_conversion_error() {
        let root = tempfile::tempdir().unwrap();
        let workspace = JobWorkspace::create(root.path(), "job-").unwrap();
        let normalizer = FfmpegNormalizer::with_binary("recapper-no-such-ffmpeg");

        let err = normalizer
            .normalize(&AudioArtifact::new(workspace.file("in.webm")), &workspace)
            .await
            .unwrap_err();

        assert!(matches!(err, ConversionError::Io(_)));
    }
}
