use std::path::{Path, PathBuf};

/// Root of everything recapper keeps on disk.
pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("recapper")
}

pub fn get_model_dir(cache_dir: &Path) -> PathBuf {
    cache_dir.join("models")
}

/// Parent directory of per-job scratch workspaces.
pub fn get_jobs_dir(cache_dir: &Path) -> PathBuf {
    cache_dir.join("jobs")
}
