//! Progress reporting utilities for long-running operations
//!
//! This module provides standardized progress reporting functionality
//! for partitioned aggregation, using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};

/// Default style for a main progress bar
pub const DEFAULT_MAIN_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

/// Create a main progress bar with a standardized style
///
/// # Arguments
/// * `length` - Total length for the progress bar
/// * `description` - Optional description to display as the initial message
#[must_use]
pub fn create_main_progress_bar(length: u64, description: Option<&str>) -> ProgressBar {
    let pb = ProgressBar::new(length);
    if let Ok(style) = ProgressStyle::default_bar().template(DEFAULT_MAIN_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }

    if let Some(desc) = description {
        pb.set_message(desc.to_string());
    }

    pb
}

/// Progress bar over partitions; hidden unless `visible` is set
#[must_use]
pub fn partition_progress_bar(partitions: u64, visible: bool) -> ProgressBar {
    if visible {
        create_main_progress_bar(partitions, Some("Aggregating partitions"))
    } else {
        ProgressBar::hidden()
    }
}

/// Finish a progress bar with a completion message
///
/// # Arguments
/// * `pb` - The `ProgressBar` to finish
/// * `message` - Optional completion message
pub fn finish_progress_bar(pb: &ProgressBar, message: Option<&str>) {
    if let Some(msg) = message {
        pb.finish_with_message(msg.to_string());
    } else {
        pb.finish();
    }
}
