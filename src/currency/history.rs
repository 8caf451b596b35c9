//! Monthly exchange-rate history
//!
//! A rate sheet has a `date` column holding `YYYY-MM` and one column per
//! currency code. An empty cell means the currency had no quote that month.

use std::io::Read;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::util::safe_open_file;
use crate::error::{Result, VacancyError};

use super::{BASE_CURRENCY, ExchangeRates, parse_rate};

/// Length of the `YYYY-MM` month prefix of a publication timestamp
const MONTH_PREFIX_LEN: usize = 7;

/// Conversion rates keyed by month and currency code
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateHistory {
    months: FxHashMap<String, FxHashMap<String, f64>>,
    codes: FxHashSet<String>,
}

impl RateHistory {
    /// Load a rate sheet
    ///
    /// # Errors
    /// - `MissingColumn` if the sheet has no `date` column
    /// - `Config` for an unparseable rate or a month listed twice
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let date_idx = headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == "date")
            .ok_or_else(|| VacancyError::MissingColumn {
                column: "date".to_string(),
            })?;

        let codes: FxHashSet<String> = headers
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != date_idx)
            .map(|(_, code)| code.to_string())
            .collect();

        let mut months = FxHashMap::default();
        for record in csv_reader.records() {
            let record = record?;
            let month = record.get(date_idx).unwrap_or_default().to_string();

            let mut rates = FxHashMap::default();
            for (idx, code) in headers.iter().enumerate() {
                if idx == date_idx {
                    continue;
                }
                match record.get(idx) {
                    Some(value) if !value.is_empty() => {
                        rates.insert(code.to_string(), parse_rate(code, value)?);
                    }
                    _ => {}
                }
            }

            if months.insert(month.clone(), rates).is_some() {
                return Err(VacancyError::Config(format!(
                    "Month {month} appears twice in the rate history"
                )));
            }
        }

        log::debug!(
            "Loaded rate history: {} months, {} currencies",
            months.len(),
            codes.len()
        );
        Ok(Self { months, codes })
    }

    /// Load a rate sheet from a file
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = safe_open_file(path, "rate history")?;
        Self::from_csv_reader(file)
    }

    /// Multiplier converting one unit of `code` in `month` into the base currency
    ///
    /// The base currency always converts at 1.
    pub fn rate_for(&self, code: &str, month: &str) -> Result<f64> {
        if code == BASE_CURRENCY {
            return Ok(1.0);
        }
        if !self.codes.contains(code) {
            return Err(VacancyError::UnknownCurrency(code.to_string()));
        }

        self.months
            .get(month)
            .and_then(|rates| rates.get(code))
            .copied()
            .ok_or_else(|| VacancyError::MissingRate {
                code: code.to_string(),
                month: month.to_string(),
            })
    }

    /// Number of months in the sheet
    #[must_use]
    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// Whether the sheet has no months
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

impl ExchangeRates for RateHistory {
    fn rate_at(&self, code: &str, published_at: &str) -> Result<f64> {
        let month = published_at
            .get(..MONTH_PREFIX_LEN)
            .ok_or_else(|| VacancyError::MalformedDate(published_at.to_string()))?;
        self.rate_for(code, month)
    }
}
