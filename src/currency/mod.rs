//! Currency conversion
//!
//! A rate source maps a currency code to the multiplier that converts one unit
//! of that currency into the base currency (rubles). `CurrencyTable` holds one
//! fixed rate per code; `RateHistory` holds one rate per code and month and
//! converts each vacancy at the rate of its publication month. Sources are
//! built once and shared read-only across workers.

pub mod history;

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::util::safe_open_file;
use crate::error::{Result, VacancyError};

pub use history::RateHistory;

/// Code of the base currency all salaries are converted into
pub const BASE_CURRENCY: &str = "RUR";

/// Built-in conversion rates into rubles
pub const DEFAULT_RATES: [(&str, f64); 10] = [
    ("AZN", 35.68),
    ("BYR", 23.91),
    ("EUR", 59.90),
    ("GEL", 21.74),
    ("KGS", 0.76),
    ("KZT", 0.13),
    ("RUR", 1.0),
    ("UAH", 1.64),
    ("USD", 60.66),
    ("UZS", 0.0055),
];

/// Source of conversion rates into the base currency
pub trait ExchangeRates: Send + Sync {
    /// Multiplier for `code` applicable to a vacancy published at `published_at`
    ///
    /// # Errors
    /// - `UnknownCurrency` if the source has never heard of `code`
    /// - `MissingRate` if the code is known but has no quote for that date
    fn rate_at(&self, code: &str, published_at: &str) -> Result<f64>;
}

/// Lookup from currency code to base-currency multiplier
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyTable {
    rates: FxHashMap<String, f64>,
}

impl CurrencyTable {
    /// Create a table from an existing map
    #[must_use]
    pub const fn new(rates: FxHashMap<String, f64>) -> Self {
        Self { rates }
    }

    /// Multiplier converting one unit of `code` into the base currency
    ///
    /// # Errors
    /// Returns `UnknownCurrency` if the code is not in the table
    pub fn rate_for(&self, code: &str) -> Result<f64> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| VacancyError::UnknownCurrency(code.to_string()))
    }

    /// Number of currencies in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether the table has no currencies
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Load a two-column `currency,rate` table
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rates = FxHashMap::default();
        for record in csv_reader.records() {
            let record = record?;
            let (Some(code), Some(rate)) = (record.get(0), record.get(1)) else {
                return Err(VacancyError::Config(format!(
                    "Currency table row has {} fields, expected 2",
                    record.len()
                )));
            };
            let rate = parse_rate(code, rate)?;
            rates.insert(code.to_string(), rate);
        }

        log::debug!("Loaded {} currency rates", rates.len());
        Ok(Self::new(rates))
    }

    /// Load a two-column `currency,rate` table from a file
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = safe_open_file(path, "currency table")?;
        Self::from_csv_reader(file)
    }
}

impl ExchangeRates for CurrencyTable {
    fn rate_at(&self, code: &str, _published_at: &str) -> Result<f64> {
        self.rate_for(code)
    }
}

impl Default for CurrencyTable {
    fn default() -> Self {
        DEFAULT_RATES
            .iter()
            .map(|&(code, rate)| (code.to_string(), rate))
            .collect()
    }
}

impl FromIterator<(String, f64)> for CurrencyTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

pub(crate) fn parse_rate(code: &str, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(rate) if rate.is_finite() && rate >= 0.0 => Ok(rate),
        _ => Err(VacancyError::Config(format!(
            "Invalid rate '{value}' for currency {code}"
        ))),
    }
}
