//! Aggregation algorithms for vacancy statistics
//!
//! This module contains the single-pass aggregator, the projection set it
//! produces, and the year-partitioned parallel driver built on the same fold.

pub mod aggregator;
pub mod partition;
pub mod projection;

// Re-export commonly used items
pub use aggregator::{
    Aggregator, CityAccumulator, DEFAULT_TOP_CITIES, MIN_CITY_SHARE, SalaryBucket,
    YearAccumulator, YearSummary, round_share,
};
pub use partition::{PartitionedAggregator, partition_by_year};
pub use projection::{CityProjections, ProjectionSet};
