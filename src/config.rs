//! Filesystem locations: data directory, log directory, report directory.

use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "pocket-hornet";
pub const DATA_DIR_ENV: &str = "POCKET_HORNET_DATA_DIR";

/// Platform data directory joined with the app directory name.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Explicit directory first, then `POCKET_HORNET_DATA_DIR`, then the
/// platform default.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    match std::env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => default_data_dir(),
    }
}

pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

pub fn reports_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("reports")
}
