//! End-to-end pipeline: read, normalize, aggregate
//!
//! The pipeline reads every valid row, normalizes it against the currency
//! table and aggregates the records either in one pass or through the
//! year-partitioned driver. Row-level problems drop the row; any other error
//! ends the run without projections.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;

use crate::algorithm::{Aggregator, PartitionedAggregator, ProjectionSet};
use crate::config::PipelineConfig;
use crate::currency::ExchangeRates;
use crate::error::Result;
use crate::error::util::safe_open_file;
use crate::models::VacancyRecord;
use crate::normalizer::RecordNormalizer;
use crate::reader::{ReadStats, VacancyReader};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Projections together with the row counters of the run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// The six projections
    pub projections: ProjectionSet,
    /// Rows read and rejected
    pub stats: ReadStats,
}

/// Aggregate normalized records with the strategy selected in `config`
pub fn aggregate_records(records: &[VacancyRecord], config: &PipelineConfig) -> Result<ProjectionSet> {
    if config.parallel {
        PartitionedAggregator::from_config(config).aggregate(records)
    } else {
        let mut aggregator = Aggregator::new(config.role.as_str()).with_top_cities(config.top_cities);
        aggregator.fold_all(records);
        aggregator.finalize()
    }
}

/// Run the pipeline over any CSV byte source
pub fn run_on_reader<R: Read>(
    source: R,
    config: &PipelineConfig,
    rates: &dyn ExchangeRates,
) -> Result<PipelineOutput> {
    let mut reader = VacancyReader::from_reader(source)?;
    let normalizer = RecordNormalizer::new(rates);

    let (records, dropped) = normalizer.normalize_all(reader.rows())?;
    let mut stats = reader.stats();
    stats.rows_rejected += dropped;

    let projections = aggregate_records(&records, config)?;
    Ok(PipelineOutput { projections, stats })
}

/// Run the pipeline over a CSV file
pub fn run_pipeline(
    input: &Path,
    config: &PipelineConfig,
    rates: &dyn ExchangeRates,
) -> Result<PipelineOutput> {
    log_operation_start("Aggregating vacancies from", input);
    info!("{config}");
    let start = Instant::now();

    let file = safe_open_file(input, "vacancy data")?;
    let output = run_on_reader(file, config, rates)?;
    log_operation_complete(input, output.stats, Some(start.elapsed()));

    Ok(output)
}

/// Run the file-backed partitioned driver over a directory of per-year files
pub fn run_partition_dir(
    dir: &Path,
    config: &PipelineConfig,
    rates: &dyn ExchangeRates,
) -> Result<PipelineOutput> {
    log_operation_start("Aggregating partition files from", dir);
    let start = Instant::now();

    let (projections, stats) =
        PartitionedAggregator::from_config(config).aggregate_partition_dir(dir, rates)?;
    log_operation_complete(dir, stats, Some(start.elapsed()));

    Ok(PipelineOutput { projections, stats })
}

/// Run the file-backed partitioned driver over exactly the given files
///
/// Other CSV files sitting next to them are not read.
pub fn run_partition_files(
    files: &[PathBuf],
    config: &PipelineConfig,
    rates: &dyn ExchangeRates,
) -> Result<PipelineOutput> {
    let start = Instant::now();

    let (projections, stats) =
        PartitionedAggregator::from_config(config).aggregate_partition_files(files, rates)?;
    info!(
        "Aggregated {} partition files in {:?}: {} rows accepted, {} rejected",
        files.len(),
        start.elapsed(),
        stats.rows_accepted(),
        stats.rows_rejected
    );

    Ok(PipelineOutput { projections, stats })
}
