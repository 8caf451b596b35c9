//! Logging utilities
//!
//! Consistent log lines for reading, normalizing and aggregating inputs.

use std::path::Path;
use std::time::Duration;

use crate::reader::ReadStats;

/// Log an operation start
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `path` - Path of the file or directory being operated on
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log the row counters of a finished read
///
/// # Arguments
/// * `path` - Input file or partition directory
/// * `stats` - Row counters for the read
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(path: &Path, stats: ReadStats, elapsed: Option<Duration>) {
    let timing = elapsed.map(|d| format!(" in {d:?}")).unwrap_or_default();
    log::info!(
        "Read {} rows from {}{timing}: {} accepted, {} rejected",
        stats.rows_read,
        path.display(),
        stats.rows_accepted(),
        stats.rows_rejected
    );

    if stats.rows_read > 0 && stats.rows_accepted() == 0 {
        log_warning("No valid vacancy rows found", Some(path));
    }
}

/// Log a warning, optionally tied to a path
///
/// # Arguments
/// * `message` - Warning message
/// * `path` - Optional path related to the warning
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}
