use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use recapper_core::{
    JobId, JobRequest, JobSnapshot, JobState, MemoryJobStore, Provider, Stages, VaderAnalyzer,
    WorkerConfig, format_segments, format_summary_readable, start_service,
    stages::{
        ChatSummarizer, FfmpegNormalizer, WhisperTranscriber, YtDlpSource, transcribe::ensure_model,
    },
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Openai,
    Grok,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Openai => Provider::Openai,
            CliProvider::Grok => Provider::Grok,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "recapper")]
#[command(
    about = "Transcribe videos with Whisper, score keyword excerpts, and generate AI summaries"
)]
struct Cli {
    /// Video URLs, processed as independent jobs
    #[arg(required = true)]
    urls: Vec<String>,

    /// Number of sentences in the summary
    #[arg(short, long, default_value_t = 5)]
    sentences: u32,

    /// Comma-separated keywords to pull excerpts for
    #[arg(short, long, default_value = "")]
    keywords: String,

    /// Sentences of analysis per keyword
    #[arg(long, default_value_t = 2)]
    keyword_sentences: u32,

    /// AI provider for summaries
    #[arg(short, long, default_value = "openai")]
    provider: CliProvider,

    /// Override the provider's default chat model
    #[arg(long)]
    summary_model: Option<String>,

    /// Concurrent jobs (overrides RECAPPER_WORKERS)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Per-job timeout in seconds (overrides RECAPPER_JOB_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,

    /// whisper.cpp model file (overrides RECAPPER_WHISPER_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Also print the full timestamped transcript
    #[arg(long)]
    segments: bool,
}

impl Cli {
    fn worker_config(&self) -> WorkerConfig {
        let mut config = WorkerConfig::from_env();
        if let Some(workers) = self.workers {
            config.worker_count = workers;
        }
        if let Some(timeout) = self.timeout {
            config.job_timeout = Duration::from_secs(timeout);
        }
        if let Some(model) = &self.model {
            config.whisper_model = model.clone();
        }
        config
    }

    fn request(&self, url: &str) -> JobRequest {
        JobRequest {
            video_reference: url.to_string(),
            summary_sentence_count: self.sentences,
            keywords: self.keywords.clone(),
            per_keyword_sentence_count: self.keyword_sentences,
        }
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(spinner_style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

extern "C" fn whisper_log_callback(
    _level: u32,
    _message: *const std::ffi::c_char,
    _user_data: *mut std::ffi::c_void,
) {
    // silent
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("recapper=info,recapper_core=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

struct Tracked {
    url: String,
    job_id: JobId,
    spinner: ProgressBar,
    started: Instant,
    outcome: Option<JobSnapshot>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let provider: Provider = cli.provider.clone().into();

    unsafe {
        whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
    }

    // Validate API key early
    let summarizer = match ChatSummarizer::from_provider(&provider) {
        Ok(summarizer) => match &cli.summary_model {
            Some(model) => summarizer.with_model(model.clone()),
            None => summarizer,
        },
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let config = cli.worker_config();
    info!(?config, "configuration loaded");

    println!(
        "\n{}  {}\n",
        style("recapper").cyan().bold(),
        style("Video Summarizer").dim()
    );

    let spinner = create_spinner("Checking model...");
    let model_path = ensure_model(&config.cache_dir, &config.whisper_model)
        .await
        .context("failed to fetch whisper model")?;
    let transcriber = WhisperTranscriber::load(model_path, config.use_gpu)
        .await
        .context("failed to load whisper model")?;
    spinner.finish_with_message(format!(
        "{} Model ready: {}, summaries by {}",
        style("✓").green().bold(),
        style(&config.whisper_model).dim(),
        style(provider.name()).yellow()
    ));

    println!("{}", style("─".repeat(60)).dim());

    let stages = Stages {
        source: Arc::new(YtDlpSource::new()),
        normalizer: Arc::new(FfmpegNormalizer::new()),
        transcriber: Arc::new(transcriber),
        sentiment: Arc::new(VaderAnalyzer::new()),
        summarizer: Arc::new(summarizer),
    };
    let store = Arc::new(MemoryJobStore::new());
    let handle = start_service(store, stages, &config);
    let service = handle.service();

    let progress = MultiProgress::new();
    let mut tracked = Vec::with_capacity(cli.urls.len());
    for url in &cli.urls {
        let job_id = service
            .submit(cli.request(url))
            .await
            .with_context(|| format!("failed to submit {url}"))?;
        let spinner = progress.add(create_spinner(&format!("{url}: Queued")));
        tracked.push(Tracked {
            url: url.clone(),
            job_id,
            spinner,
            started: Instant::now(),
            outcome: None,
        });
    }

    let total_start = Instant::now();
    while tracked.iter().any(|t| t.outcome.is_none()) {
        tokio::time::sleep(POLL_INTERVAL).await;
        for job in tracked.iter_mut().filter(|t| t.outcome.is_none()) {
            let Some(snapshot) = service.status(&job.job_id).await else {
                continue;
            };
            match snapshot.state {
                JobState::Succeeded => {
                    job.spinner.finish_with_message(format!(
                        "{} {} {}",
                        style("✓").green().bold(),
                        job.url,
                        style(format!("[{}]", format_duration(job.started.elapsed()))).dim()
                    ));
                    job.outcome = Some(snapshot);
                }
                JobState::Failed => {
                    job.spinner.finish_with_message(format!(
                        "{} {}: {}",
                        style("✗").red().bold(),
                        job.url,
                        snapshot.status
                    ));
                    job.outcome = Some(snapshot);
                }
                JobState::Pending | JobState::Running => {
                    job.spinner
                        .set_message(format!("{}: {}", job.url, snapshot.status));
                }
            }
        }
    }

    handle.shutdown().await;

    println!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );

    let mut failures = 0;
    for job in &tracked {
        let Some(snapshot) = &job.outcome else {
            continue;
        };
        println!("{}", style("─".repeat(60)).dim());
        println!("{}\n", style(&job.url).cyan().bold());

        match &snapshot.result {
            Some(result) if cli.json => println!("{}", serde_json::to_string_pretty(result)?),
            Some(result) => {
                println!("{}", format_summary_readable(result));
                if cli.segments {
                    println!("## Transcript\n\n{}\n", format_segments(&result.transcript_timestamped));
                }
            }
            None => {
                failures += 1;
                let message = snapshot.error.as_deref().unwrap_or(&snapshot.status);
                println!("{} {}\n", style("Error:").red().bold(), message);
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }

    Ok(())
}
