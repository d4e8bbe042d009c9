//! Diagnostics module for Pocket Hornet.
//!
//! Provides:
//! - **About info**: version, build timestamp, git SHA, platform
//! - **Health**: schema version, database size, ledger and archive counts
//! - **Log rotation helpers**: used by `lib.rs` to configure rolling log files.

use crate::db::DbState;
use crate::error::PosResult;
use crate::state::PosState;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Maximum number of log files to retain.
pub const MAX_LOG_FILES: usize = 10;

/// File name prefix of the rolling log files.
pub const LOG_FILE_PREFIX: &str = "pocket-hornet";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
    pub version: &'static str,
    pub build_timestamp: &'static str,
    pub git_sha: &'static str,
    pub platform: &'static str,
    pub arch: &'static str,
    pub rust_version: &'static str,
}

/// Returns version, build timestamp, git SHA, and platform info.
pub fn get_about_info() -> AboutInfo {
    AboutInfo {
        version: env!("CARGO_PKG_VERSION"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        git_sha: env!("BUILD_GIT_SHA"),
        platform: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        rust_version: env!("CARGO_PKG_RUST_VERSION"),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub schema_version: i64,
    pub db_path: String,
    pub db_size_bytes: u64,
    pub transactions: usize,
    pub cash_log_entries: usize,
    pub archived_reports: i64,
    pub log_files: usize,
}

/// Collects storage health for the `about` screen.
pub fn get_health(db: &DbState, state: &PosState, log_dir: &Path) -> PosResult<Health> {
    let (schema_version, archived_reports) = {
        let conn = db.lock()?;
        let schema_version: i64 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);
        let archived_reports: i64 = conn
            .query_row("SELECT COUNT(*) FROM event_reports", [], |row| row.get(0))
            .unwrap_or(0);
        (schema_version, archived_reports)
    };

    Ok(Health {
        schema_version,
        db_path: db.db_path.display().to_string(),
        db_size_bytes: fs::metadata(&db.db_path).map(|m| m.len()).unwrap_or(0),
        transactions: state.transactions.len(),
        cash_log_entries: state.cash_log.len(),
        archived_reports,
        log_files: list_log_files(log_dir).len(),
    })
}

/// Rolling log files in `log_dir`, newest first.
fn list_log_files(log_dir: &Path) -> Vec<(PathBuf, std::time::SystemTime)> {
    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();
    if let Ok(entries) = fs::read_dir(log_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_log = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
            if is_log {
                let modified = entry
                    .metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .unwrap_or(std::time::UNIX_EPOCH);
                log_files.push((path, modified));
            }
        }
    }
    log_files.sort_by(|a, b| b.1.cmp(&a.1));
    log_files
}

/// Prune old log files, keeping only the most recent `MAX_LOG_FILES`.
pub fn prune_old_logs(log_dir: &Path) {
    for (path, _) in list_log_files(log_dir).iter().skip(MAX_LOG_FILES) {
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to prune log file {}: {e}", path.display());
        }
    }
}
