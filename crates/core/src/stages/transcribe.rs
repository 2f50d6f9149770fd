use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::{fs, process::Command};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::{
    cache::get_model_dir,
    error::TranscriptionError,
    stages::{AudioArtifact, Transcriber, normalize::SAMPLE_RATE},
    types::{TimestampedSegment, Transcript},
};

pub const DEFAULT_MODEL_NAME: &str = "ggml-small.bin";
const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Make sure `model_name` is present in the model cache, downloading it with
/// curl on first use.
pub async fn ensure_model(cache_dir: &Path, model_name: &str) -> Result<PathBuf, TranscriptionError> {
    let model_dir = get_model_dir(cache_dir);
    let model_path = model_dir.join(model_name);
    if model_path.exists() {
        return Ok(model_path);
    }

    fs::create_dir_all(&model_dir).await?;
    let download_url = format!("{MODEL_BASE_URL}/{model_name}");
    let partial_path = model_dir.join(format!("{model_name}.part"));

    tracing::info!(url = %download_url, "downloading whisper model");
    let output = Command::new("curl")
        .arg("-fL")
        .arg(&download_url)
        .arg("-o")
        .arg(&partial_path)
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        let _ = fs::remove_file(&partial_path).await;
        return Err(TranscriptionError::ModelDownloadFailed {
            url: download_url,
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    fs::rename(&partial_path, &model_path).await?;
    Ok(model_path)
}

/// Local whisper.cpp transcription. The model is loaded once and shared by
/// every job.
pub struct WhisperTranscriber {
    ctx: Arc<WhisperContext>,
}

impl WhisperTranscriber {
    pub async fn load(model_path: PathBuf, use_gpu: bool) -> Result<Self, TranscriptionError> {
        let ctx = tokio::task::spawn_blocking(move || {
            let load_error = |reason: String| TranscriptionError::ModelLoad {
                model_path: model_path.clone(),
                reason,
            };
            let path_str = model_path
                .to_str()
                .ok_or_else(|| load_error("model path is not valid UTF-8".to_string()))?;

            let ctx_params = WhisperContextParameters {
                use_gpu,
                flash_attn: use_gpu,
                ..Default::default()
            };
            WhisperContext::new_with_params(path_str, ctx_params)
                .map_err(|e| load_error(e.to_string()))
        })
        .await
        .map_err(|e| TranscriptionError::Inference(e.to_string()))??;

        Ok(Self { ctx: Arc::new(ctx) })
    }
}

fn centiseconds_to_secs(t: i64) -> u32 {
    u32::try_from(t.max(0) / 100).unwrap_or(u32::MAX)
}

/// Read a mono 16 kHz 16-bit WAV into normalized f32 samples.
pub fn read_samples(audio_path: &Path) -> Result<Vec<f32>, TranscriptionError> {
    let read_error = |reason: String| TranscriptionError::AudioRead {
        audio_path: audio_path.to_path_buf(),
        reason,
    };

    let mut reader = hound::WavReader::open(audio_path).map_err(|e| read_error(e.to_string()))?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.sample_rate != SAMPLE_RATE || spec.bits_per_sample != 16 {
        return Err(read_error(format!(
            "expected mono {SAMPLE_RATE} Hz 16-bit audio, got {} channel(s) at {} Hz, {} bit",
            spec.channels, spec.sample_rate, spec.bits_per_sample
        )));
    }

    reader
        .samples::<i16>()
        .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
        .collect::<Result<Vec<f32>, _>>()
        .map_err(|e| read_error(e.to_string()))
}

fn run_whisper(ctx: &WhisperContext, audio_path: &Path) -> Result<Transcript, TranscriptionError> {
    let samples = read_samples(audio_path)?;

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 5 });
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_special(false);

    let mut state = ctx
        .create_state()
        .map_err(|e| TranscriptionError::Inference(e.to_string()))?;
    state
        .full(params, &samples)
        .map_err(|e| TranscriptionError::Inference(e.to_string()))?;

    let mut text = String::new();
    let mut segments: Vec<TimestampedSegment> = Vec::new();

    for segment in state.as_iter() {
        let seg_text = match segment.to_str() {
            Ok(s) => s,
            Err(_) => continue,
        };
        segments.push(TimestampedSegment::new(
            centiseconds_to_secs(segment.start_timestamp()),
            centiseconds_to_secs(segment.end_timestamp()),
            seg_text.trim(),
        ));
        text.push_str(seg_text);
    }

    let language_index = state.full_lang_id_from_state();
    let language = whisper_rs::get_lang_str(language_index);

    Ok(Transcript {
        text: text.trim().to_string(),
        segments,
        language: language.unwrap_or("unknown").to_string(),
    })
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio: &AudioArtifact) -> Result<Transcript, TranscriptionError> {
        let ctx = Arc::clone(&self.ctx);
        let audio_path = audio.path.clone();

        tokio::task::spawn_blocking(move || run_whisper(&ctx, &audio_path))
            .await
            .map_err(|e| TranscriptionError::Inference(e.to_string()))?
    }
}
