//! A Rust library for aggregating job vacancy CSV data into yearly and
//! per-city salary statistics, with single-pass and year-partitioned
//! parallel drivers.

pub mod algorithm;
pub mod config;
pub mod currency;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod reader;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::PipelineConfig;
pub use currency::{CurrencyTable, ExchangeRates, RateHistory};
pub use error::{Result, VacancyError};
pub use models::{RawRow, VacancyRecord};
pub use normalizer::RecordNormalizer;
pub use reader::{ReadStats, VacancyReader};

// Aggregation
pub use algorithm::{Aggregator, PartitionedAggregator, ProjectionSet};
pub use pipeline::{
    PipelineOutput, aggregate_records, run_on_reader, run_partition_dir, run_partition_files,
    run_pipeline,
};

// Utility functions
pub use utils::io::{find_csv_files, split_by_year};
