//! IO utilities for vacancy files
//!
//! Discovery of partition files and splitting a vacancy file into one CSV per
//! publication year.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::error::util::validate_directory;
use crate::error::Result;
use crate::models::{RawRow, REQUIRED_COLUMNS};
use crate::normalizer::parse_year;
use crate::reader::{ReadStats, VacancyReader};

use super::logging::{log_operation_start, log_warning};

/// File name of the partition holding `year`
#[must_use]
pub fn year_file_name(year: i32) -> String {
    format!("{year}_year.csv")
}

/// Find all CSV files in a directory, sorted by path
pub fn find_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    log_operation_start("Searching for CSV files in", dir);
    validate_directory(dir, "partition files")?;

    let csv_files = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .filter_ok(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .sorted()
        .collect_vec();

    if csv_files.is_empty() {
        log_warning("No CSV files found in directory", Some(dir));
    } else {
        log::info!("Found {} CSV files in {}", csv_files.len(), dir.display());
    }

    Ok(csv_files)
}

/// Split vacancy CSV data into one file per publication year
///
/// Each output file holds the required columns of every valid row of that
/// year. Rows that fail validation or carry a malformed date are skipped.
/// Returns the written paths ascending by year together with the row counters.
pub fn split_by_year<R: Read>(source: R, out_dir: &Path) -> Result<(Vec<PathBuf>, ReadStats)> {
    validate_directory(out_dir, "per-year partition output")?;

    let mut reader = VacancyReader::from_reader(source)?;
    let mut by_year: BTreeMap<i32, Vec<RawRow>> = BTreeMap::new();
    let mut dropped = 0;

    for row in reader.rows() {
        let row = row?;
        match parse_year(&row.published_at) {
            Ok(year) => by_year.entry(year).or_default().push(row),
            Err(e) => {
                dropped += 1;
                log::debug!("Not splitting row: {e}");
            }
        }
    }

    let mut stats = reader.stats();
    stats.rows_rejected += dropped;

    let mut paths = Vec::with_capacity(by_year.len());
    for (year, rows) in by_year {
        let path = out_dir.join(year_file_name(year));
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(REQUIRED_COLUMNS)?;
        for row in &rows {
            writer.write_record(row.fields())?;
        }
        writer.flush()?;

        log::debug!("Wrote {} rows to {}", rows.len(), path.display());
        paths.push(path);
    }

    log::info!(
        "Split {} rows into {} yearly files in {}",
        stats.rows_accepted(),
        paths.len(),
        out_dir.display()
    );

    Ok((paths, stats))
}
