//! Rolling file logger
//!
//! One log file per day, `<app>-YYYY-MM-DD.log`, of which only the newest
//! `MAX_LOG_FILES` are kept. Records emitted through the `log` facade are
//! forwarded to the same subscriber.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

/// Daily files kept in the log directory
pub const MAX_LOG_FILES: usize = 7;

const DEFAULT_FILTER: &str = "info";

/// File name of the log written on `date`
pub fn log_file_name(app_name: &str, date: NaiveDate) -> String {
    format!("{}-{}.log", app_name, date.format("%Y-%m-%d"))
}

/// Install the global subscriber writing to today's file in `log_dir`.
///
/// The level filter comes from `RUST_LOG`, `info` when unset.
/// Returns the path of the file being written.
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<PathBuf, String> {
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)
        .map_err(|e| format!("Failed to create log dir {}: {}", log_dir.display(), e))?;

    let today = chrono::Local::now().date_naive();
    let path = log_dir.join(log_file_name(app_name, today));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("Failed to open log file {}: {}", path.display(), e))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| format!("Failed to install logger: {}", e))?;

    match prune_logs(log_dir, app_name, MAX_LOG_FILES) {
        Ok(0) => {}
        Ok(removed) => log::debug!("[logger] pruned {} old log files", removed),
        Err(e) => log::warn!("[logger] failed to prune old logs: {}", e),
    }

    Ok(path)
}

/// Delete all but the newest `keep` log files of `app_name`; returns how many were removed
pub fn prune_logs(log_dir: &Path, app_name: &str, keep: usize) -> std::io::Result<usize> {
    let prefix = format!("{}-", app_name);

    let mut files: Vec<PathBuf> = std::fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(".log"))
        })
        .collect();

    // dates in the names sort chronologically
    files.sort();

    let excess = files.len().saturating_sub(keep);
    for path in &files[..excess] {
        std::fs::remove_file(path)?;
    }
    Ok(excess)
}

/// Log an informational message outside of any module target
pub fn info(message: &str) {
    tracing::info!("{}", message);
}

/// Log an error message outside of any module target
pub fn error(message: &str) {
    tracing::error!("{}", message);
}
