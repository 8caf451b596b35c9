//! Module for reading vacancy CSV files with row validation.
//!
//! The reader resolves the required columns once from the header and then
//! yields validated `RawRow`s. Rows with the wrong arity, an empty required
//! field or undecodable bytes are skipped and counted; only IO failures end
//! the iteration with an error.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::util::safe_open_file;
use crate::error::Result;
use crate::models::{HeaderMap, RawRow};

/// Counters collected while reading and normalizing rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Data rows seen, excluding the header
    pub rows_read: usize,
    /// Rows dropped by validation or normalization
    pub rows_rejected: usize,
}

impl ReadStats {
    /// Rows that survived validation
    #[must_use]
    pub const fn rows_accepted(&self) -> usize {
        self.rows_read - self.rows_rejected
    }

    /// Add another set of counters to this one
    pub fn absorb(&mut self, other: Self) {
        self.rows_read += other.rows_read;
        self.rows_rejected += other.rows_rejected;
    }
}

/// A reader for vacancy CSV data
pub struct VacancyReader<R: Read> {
    reader: csv::Reader<R>,
    header: HeaderMap,
    stats: ReadStats,
}

impl VacancyReader<File> {
    /// Open a vacancy CSV file
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = safe_open_file(path, "vacancy data")?;
        Self::from_reader(file)
    }
}

impl<R: Read> VacancyReader<R> {
    /// Wrap any byte source holding vacancy CSV data
    ///
    /// # Errors
    /// Fails if the header cannot be read or lacks a required column
    pub fn from_reader(source: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(source);
        let header = HeaderMap::from_headers(reader.headers()?)?;

        Ok(Self {
            reader,
            header,
            stats: ReadStats::default(),
        })
    }

    /// Counters for the rows read so far
    #[must_use]
    pub const fn stats(&self) -> ReadStats {
        self.stats
    }

    /// Iterate over the valid rows of the input
    pub fn rows(&mut self) -> RawRows<'_, R> {
        let Self {
            reader,
            header,
            stats,
        } = self;

        RawRows {
            records: reader.records(),
            header,
            stats,
        }
    }

    /// Read all valid rows into memory
    pub fn read_all(&mut self) -> Result<Vec<RawRow>> {
        self.rows().collect()
    }
}

/// Iterator over the valid rows of a `VacancyReader`
pub struct RawRows<'r, R: Read> {
    records: csv::StringRecordsIter<'r, R>,
    header: &'r HeaderMap,
    stats: &'r mut ReadStats,
}

impl<R: Read> Iterator for RawRows<'_, R> {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let result = self.records.next()?;
            self.stats.rows_read += 1;

            let record = match result {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Some(Err(e.into())),
                Err(e) => {
                    self.stats.rows_rejected += 1;
                    log::debug!("Skipping undecodable row: {e}");
                    continue;
                }
            };

            match RawRow::from_record(&record, self.header) {
                Ok(row) => return Some(Ok(row)),
                Err(e) => {
                    self.stats.rows_rejected += 1;
                    let line = record.position().map_or(0, csv::Position::line);
                    log::debug!("Skipping line {line}: {e}");
                }
            }
        }
    }
}
