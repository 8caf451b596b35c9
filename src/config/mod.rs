//! Configuration for the vacancy pipeline.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::algorithm::DEFAULT_TOP_CITIES;
use crate::currency::{CurrencyTable, ExchangeRates, RateHistory};
use crate::error::util::safe_open_file;
use crate::error::{Result, VacancyError};

/// Upper bound on the default worker count
pub const MAX_DEFAULT_WORKERS: usize = 4;

/// Default worker pool size: one per CPU, at most `MAX_DEFAULT_WORKERS`
#[must_use]
pub fn default_workers() -> usize {
    num_cpus::get().clamp(1, MAX_DEFAULT_WORKERS)
}

/// Configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Role substring used for the per-role projections
    pub role: String,
    /// Worker pool size for partitioned aggregation
    pub workers: usize,
    /// Use the year-partitioned driver instead of a single pass
    pub parallel: bool,
    /// Number of cities kept in the city projections
    pub top_cities: usize,
    /// Show progress bars during partitioned aggregation
    pub show_progress: bool,
    /// Optional `currency,rate` CSV replacing the built-in rates
    pub currency_table: Option<PathBuf>,
    /// Optional monthly rate sheet; each vacancy converts at the rate of its
    /// publication month
    pub rate_history: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            role: String::new(),
            workers: default_workers(),
            parallel: false,
            top_cities: DEFAULT_TOP_CITIES,
            show_progress: false,
            currency_table: None,
            rate_history: None,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; absent fields take defaults
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let file = safe_open_file(path, "pipeline configuration")?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(VacancyError::Config("workers must be at least 1".to_string()));
        }
        if self.top_cities == 0 {
            return Err(VacancyError::Config("top_cities must be at least 1".to_string()));
        }
        if self.currency_table.is_some() && self.rate_history.is_some() {
            return Err(VacancyError::Config(
                "currency_table and rate_history are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }

    /// Rate source for the run
    ///
    /// A rate history wins when configured, then a flat currency table file,
    /// then the built-in rates.
    pub fn exchange_rates(&self) -> Result<Box<dyn ExchangeRates>> {
        if let Some(path) = &self.rate_history {
            return Ok(Box::new(RateHistory::from_csv_path(path)?));
        }
        Ok(Box::new(self.currency_table()?))
    }

    /// Currency table for the run: the configured file or the built-in rates
    pub fn currency_table(&self) -> Result<CurrencyTable> {
        match &self.currency_table {
            Some(path) => CurrencyTable::from_csv_path(path),
            None => Ok(CurrencyTable::default()),
        }
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Configuration:")?;
        writeln!(f, "  Role: '{}'", self.role)?;
        writeln!(f, "  Parallel: {}", self.parallel)?;
        writeln!(f, "  Workers: {}", self.workers)?;
        writeln!(f, "  Top Cities: {}", self.top_cities)?;
        if let Some(path) = &self.currency_table {
            writeln!(f, "  Currency Table: {}", path.display())?;
        }
        if let Some(path) = &self.rate_history {
            writeln!(f, "  Rate History: {}", path.display())?;
        }
        Ok(())
    }
}
