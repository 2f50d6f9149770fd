//! Worker configuration.

use std::{path::PathBuf, time::Duration};

use crate::{cache::get_root_cache_dir, stages::transcribe::DEFAULT_MODEL_NAME};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of concurrent workers, one job each
    pub worker_count: usize,
    /// Jobs that can wait in the queue before submission blocks
    pub queue_capacity: usize,
    /// Hard limit for a single job, enforced outside the pipeline
    pub job_timeout: Duration,
    /// Root for models and per-job scratch directories
    pub cache_dir: PathBuf,
    /// whisper.cpp model file name
    pub whisper_model: String,
    pub use_gpu: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_count: 1,
            queue_capacity: 64,
            job_timeout: Duration::from_secs(600),
            cache_dir: get_root_cache_dir(),
            whisper_model: DEFAULT_MODEL_NAME.to_string(),
            use_gpu: true,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl WorkerConfig {
    /// Defaults overridden by `RECAPPER_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            worker_count: env_parse("RECAPPER_WORKERS").unwrap_or(defaults.worker_count),
            queue_capacity: env_parse("RECAPPER_QUEUE_CAPACITY").unwrap_or(defaults.queue_capacity),
            job_timeout: env_parse("RECAPPER_JOB_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.job_timeout),
            cache_dir: std::env::var("RECAPPER_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            whisper_model: std::env::var("RECAPPER_WHISPER_MODEL")
                .unwrap_or(defaults.whisper_model),
            use_gpu: env_parse("RECAPPER_USE_GPU").unwrap_or(defaults.use_gpu),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_runs_one_worker_with_ten_minute_timeout() {
        let config = WorkerConfig::default();

        assert_eq!(config.worker_count, 1);
        assert_eq!(config.job_timeout, Duration::from_secs(600));
        assert!(config.cache_dir.ends_with("recapper"));
    }
}
