use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use url::Url;

use crate::{
    error::AcquisitionError,
    stages::{AudioArtifact, AudioSource, JobWorkspace},
};

/// yt-dlp messages that mean the link itself is bad rather than the video
/// being unreachable.
const INVALID_LINK_MARKERS: &[&str] = &[
    "unsupported url",
    "is not a valid url",
    "no video formats found",
    "incomplete youtube id",
    "unable to extract video id",
];

/// Downloads the best audio-only stream with yt-dlp.
pub struct YtDlpSource {
    binary: String,
}

impl Default for YtDlpSource {
    fn default() -> Self {
        Self::with_binary("yt-dlp")
    }
}

impl YtDlpSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

/// Reject anything that is not an absolute http(s) URL with a host.
pub fn validate_reference(reference: &str) -> Result<Url, AcquisitionError> {
    let invalid = |reason: String| AcquisitionError::InvalidReference {
        reference: reference.to_string(),
        reason,
    };

    let url = Url::parse(reference.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

fn classify_failure(reference: &str, stderr: &str) -> AcquisitionError {
    let lowered = stderr.to_lowercase();
    let reason = stderr.trim().to_string();

    if INVALID_LINK_MARKERS.iter().any(|m| lowered.contains(m)) {
        AcquisitionError::InvalidReference {
            reference: reference.to_string(),
            reason,
        }
    } else {
        AcquisitionError::Unavailable {
            reference: reference.to_string(),
            reason,
        }
    }
}

#[async_trait]
impl AudioSource for YtDlpSource {
    async fn acquire(
        &self,
        reference: &str,
        workspace: &JobWorkspace,
    ) -> Result<AudioArtifact, AcquisitionError> {
        let url = validate_reference(reference)?;
        let output_template = workspace.file("source.%(ext)s");

        let output = Command::new(&self.binary)
            .arg(url.as_str())
            .arg("--no-playlist")
            .arg("--print")
            .arg("after_move:filepath")
            .arg("--extractor-args")
            .arg("youtube:player_client=android,web")
            .arg("-f")
            .arg("bestaudio/best")
            .arg("-o")
            .arg(&output_template)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(classify_failure(
                reference,
                &String::from_utf8_lossy(&output.stderr),
            ));
        }

        let stdout_str = String::from_utf8_lossy(output.stdout.as_slice());
        let filepath = stdout_str.lines().last().unwrap_or_default().trim();
        if filepath.is_empty() {
            return Err(AcquisitionError::Unavailable {
                reference: reference.to_string(),
                reason: "downloader reported no output file".to_string(),
            });
        }

        tracing::debug!(path = %filepath, "audio downloaded");
        Ok(AudioArtifact::new(PathBuf::from(filepath)))
    }
}
