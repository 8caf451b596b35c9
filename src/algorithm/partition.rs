//! Year-partitioned parallel aggregation
//!
//! Records are split into partitions along the year boundary and each
//! partition is summarized on a bounded rayon pool. Because every year lives
//! in exactly one partition, the per-year summaries merge by disjoint union.
//! The city projections need every record and are computed in one global pass
//! after the partitions are merged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::*;

use crate::config::{PipelineConfig, default_workers};
use crate::currency::ExchangeRates;
use crate::error::{Result, VacancyError};
use crate::models::VacancyRecord;
use crate::normalizer::RecordNormalizer;
use crate::reader::{ReadStats, VacancyReader};
use crate::utils::io::find_csv_files;
use crate::utils::logging::{finish_progress_bar, partition_progress_bar};

use super::aggregator::{CityAccumulator, DEFAULT_TOP_CITIES, YearAccumulator, YearSummary};
use super::projection::ProjectionSet;

/// Group records by publication year, ascending
#[must_use]
pub fn partition_by_year(records: &[VacancyRecord]) -> BTreeMap<i32, Vec<&VacancyRecord>> {
    let mut partitions: BTreeMap<i32, Vec<&VacancyRecord>> = BTreeMap::new();
    for record in records {
        partitions.entry(record.year).or_default().push(record);
    }
    partitions
}

/// Summarize one partition
///
/// A partition may hold several whole years; it must not share a year with
/// any other partition.
fn summarize<'a, I>(records: I, role: &str) -> Vec<YearSummary>
where
    I: IntoIterator<Item = &'a VacancyRecord>,
{
    let mut years = YearAccumulator::new();
    for record in records {
        years.fold(record, record.matches_role(role));
    }
    years.summaries()
}

/// Output of one file-backed partition worker
#[derive(Debug)]
struct PartitionOutcome {
    summary: Option<YearSummary>,
    cities: CityAccumulator,
    stats: ReadStats,
}

/// Runs the aggregation with one task per year partition
#[derive(Debug, Clone)]
pub struct PartitionedAggregator {
    role: String,
    top_cities: usize,
    workers: usize,
    show_progress: bool,
}

impl PartitionedAggregator {
    /// Create a driver for the given role substring
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            top_cities: DEFAULT_TOP_CITIES,
            workers: default_workers(),
            show_progress: false,
        }
    }

    /// Create a driver from the pipeline configuration
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            role: config.role.clone(),
            top_cities: config.top_cities,
            workers: config.workers,
            show_progress: config.show_progress,
        }
    }

    /// Set the worker pool size (at least one)
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the length of the city projections
    #[must_use]
    pub fn with_top_cities(mut self, top_cities: usize) -> Self {
        self.top_cities = top_cities;
        self
    }

    /// Worker pool size
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    fn build_pool(&self) -> Result<rayon::ThreadPool> {
        Ok(rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("partition-{i}"))
            .build()?)
    }

    /// Aggregate in-memory records, one partition per year
    ///
    /// The city pass walks `records` in input order, so the result matches
    /// the single-pass aggregator exactly.
    pub fn aggregate(&self, records: &[VacancyRecord]) -> Result<ProjectionSet> {
        let partitions = partition_by_year(records);
        let mut cities = CityAccumulator::new();
        for record in records {
            cities.fold(record);
        }
        self.summarize_chunks(partitions.into_values().collect(), cities)
    }

    /// Aggregate pre-built partitions
    ///
    /// Each chunk may hold several years, but no year may appear in more than
    /// one chunk; a shared year fails with `PartitionOverlap`.
    pub fn aggregate_chunks(&self, chunks: Vec<Vec<&VacancyRecord>>) -> Result<ProjectionSet> {
        // The city projections need a global pass over every record
        let mut cities = CityAccumulator::new();
        for record in chunks.iter().flatten() {
            cities.fold(record);
        }
        self.summarize_chunks(chunks, cities)
    }

    fn summarize_chunks(
        &self,
        chunks: Vec<Vec<&VacancyRecord>>,
        cities: CityAccumulator,
    ) -> Result<ProjectionSet> {
        info!(
            "Aggregating {} partitions on {} workers",
            chunks.len(),
            self.workers
        );

        let pool = self.build_pool()?;
        let pb = partition_progress_bar(chunks.len() as u64, self.show_progress);
        let role = self.role.as_str();

        let partials: Vec<Vec<YearSummary>> = pool.install(|| {
            chunks
                .par_iter()
                .map(|chunk| {
                    let summaries = summarize(chunk.iter().copied(), role);
                    pb.inc(1);
                    summaries
                })
                .collect()
        });
        finish_progress_bar(&pb, Some("Partitions aggregated"));

        ProjectionSet::from_parts(
            partials.into_iter().flatten(),
            cities.finalize(self.top_cities),
        )
    }

    /// Aggregate a directory of per-year CSV files
    ///
    /// Every `*.csv` file in `dir` is one partition; see
    /// [`Self::aggregate_partition_files`].
    pub fn aggregate_partition_dir(
        &self,
        dir: &Path,
        rates: &dyn ExchangeRates,
    ) -> Result<(ProjectionSet, ReadStats)> {
        let files = find_csv_files(dir)?;
        info!("Aggregating partition files from {}", dir.display());
        self.aggregate_partition_files(&files, rates)
    }

    /// Aggregate the given per-year CSV files
    ///
    /// Every file is one partition and is read, validated and normalized by
    /// its own worker. A file holding more than one year fails with
    /// `PartitionMismatch`, two files holding the same year fail with
    /// `PartitionOverlap`. The first fatal error stops the run and no
    /// projections are returned.
    pub fn aggregate_partition_files(
        &self,
        files: &[PathBuf],
        rates: &dyn ExchangeRates,
    ) -> Result<(ProjectionSet, ReadStats)> {
        info!(
            "Aggregating {} partition files on {} workers",
            files.len(),
            self.workers
        );

        let pool = self.build_pool()?;
        let pb = partition_progress_bar(files.len() as u64, self.show_progress);
        let normalizer = RecordNormalizer::new(rates);
        let role = self.role.as_str();

        let outcomes: Vec<PartitionOutcome> = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let outcome = read_partition(path, &normalizer, role);
                    pb.inc(1);
                    outcome
                })
                .collect::<Result<Vec<_>>>()
        })?;
        finish_progress_bar(&pb, Some("Partition files aggregated"));

        let mut stats = ReadStats::default();
        let mut cities = CityAccumulator::new();
        let mut summaries = Vec::with_capacity(outcomes.len());

        // Merge city partials in ascending year order so the first-seen order
        // does not depend on scheduling
        for outcome in outcomes
            .into_iter()
            .sorted_by_key(|o| o.summary.map_or(i32::MAX, |s| s.year))
        {
            stats.absorb(outcome.stats);
            cities.merge(outcome.cities);
            summaries.extend(outcome.summary);
        }

        let projections = ProjectionSet::from_parts(summaries, cities.finalize(self.top_cities))?;
        Ok((projections, stats))
    }
}

fn read_partition(
    path: &Path,
    normalizer: &RecordNormalizer<'_>,
    role: &str,
) -> Result<PartitionOutcome> {
    debug!("Reading partition {}", path.display());

    let mut reader = VacancyReader::from_path(path)?;
    let (records, dropped) = normalizer.normalize_all(reader.rows())?;
    let mut stats = reader.stats();
    stats.rows_rejected += dropped;

    if let Some(first) = records.first() {
        if let Some(other) = records.iter().find(|r| r.year != first.year) {
            return Err(VacancyError::PartitionMismatch {
                path: path.to_path_buf(),
                expected: first.year,
                found: other.year,
            });
        }
    }

    let mut cities = CityAccumulator::new();
    for record in &records {
        cities.fold(record);
    }

    let summary = summarize(&records, role).into_iter().next();
    debug!(
        "Partition {} summarized: {} records",
        path.display(),
        records.len()
    );

    Ok(PartitionOutcome {
        summary,
        cities,
        stats,
    })
}
