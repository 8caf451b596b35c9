//! Utility functions for error handling
//!
//! File-system helpers that attach the path and the reason for access to
//! the underlying IO error.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, VacancyError};

fn io_error(kind: io::ErrorKind, message: String) -> VacancyError {
    VacancyError::Io(io::Error::new(kind, message))
}

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(io_error(
            io::ErrorKind::NotFound,
            format!("File not found: {} (needed for: {purpose})", path.display()),
        ));
    }

    if !path.is_file() {
        return Err(io_error(
            io::ErrorKind::InvalidInput,
            format!("Path is not a file: {} (expected a file for: {purpose})", path.display()),
        ));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => "Permission denied - check file permissions".to_string(),
            _ => format!("Failed to open file for: {purpose}"),
        };
        io_error(e.kind(), format!("{context}: {} ({e})", path.display()))
    })
}

/// Check if a directory exists and is readable, with rich error information
pub fn validate_directory(path: &Path, purpose: &str) -> Result<()> {
    if !path.exists() {
        return Err(io_error(
            io::ErrorKind::NotFound,
            format!("Directory not found: {} (needed for: {purpose})", path.display()),
        ));
    }

    if !path.is_dir() {
        return Err(io_error(
            io::ErrorKind::InvalidInput,
            format!("Path is not a directory: {} (expected a directory for: {purpose})", path.display()),
        ));
    }

    fs::read_dir(path).map(|_| ()).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => {
                "Permission denied - check directory permissions".to_string()
            }
            _ => format!("Failed to access directory for: {purpose}"),
        };
        io_error(e.kind(), format!("{context}: {} ({e})", path.display()))
    })
}
