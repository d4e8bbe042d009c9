//! Pocket Hornet - point of sale for paintball events.
//!
//! The library holds the whole ledger: catalog, checkout, team tabs, the
//! cash box and the profit report, persisted as a snapshot in a local SQLite
//! file. The `pocket-hornet` binary is a thin command line front end over it
//! (see `commands`).

use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

pub mod cashbook;
pub mod catalog;
pub mod checkout;
mod commands;
pub mod config;
pub mod config_transfer;
mod data_helpers;
pub mod db;
pub mod defaults;
pub mod diagnostics;
pub mod error;
pub mod event_report;
pub mod ledger;
pub mod models;
pub mod money;
mod output;
pub mod settlement;
pub mod state;
pub mod stats;
pub mod store;

pub use error::{PosError, PosResult};
pub use money::Money;
pub use state::PosState;

/// Short random id with a readable prefix, e.g. `tx-3f9a0c12be47`.
pub(crate) fn new_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &raw[..12])
}

/// Initialize structured logging: everything the filter lets through goes
/// to a daily rolling file, the console (stderr) only shows warnings unless
/// `verbose` is set.
pub fn init_logging(log_dir: &Path, verbose: bool, json_file: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pocket_hornet_lib=debug"));

    // Prune old log files before setting up the appender
    diagnostics::prune_old_logs(log_dir);
    std::fs::create_dir_all(log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, diagnostics::LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let (text_file_layer, json_file_layer) = if json_file {
        (
            None,
            Some(
                fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true),
            ),
        )
    } else {
        (
            Some(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_target(true),
            ),
            None,
        )
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_level);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(text_file_layer)
        .with(json_file_layer)
        .try_init();

    // The process is short-lived; leaking the guard keeps the writer alive
    // until exit, when the OS flushes it.
    std::mem::forget(guard);
}

/// Entry point of the `pocket-hornet` binary.
pub fn run() -> anyhow::Result<()> {
    let cli = commands::Cli::parse();
    let data_dir = config::resolve_data_dir(cli.data_dir.as_deref());
    init_logging(&config::log_dir(&data_dir), cli.verbose, cli.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %data_dir.display(),
        "Starting Pocket Hornet"
    );

    cli.execute(data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_has_prefix_and_is_unique() {
        let a = new_id("tx");
        let b = new_id("tx");
        assert!(a.starts_with("tx-"));
        assert_eq!(a.len(), 15);
        assert_ne!(a, b);
    }
}
