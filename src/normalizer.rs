//! Record normalization
//!
//! Turns a validated `RawRow` into a `VacancyRecord`: averages the salary
//! bounds, converts them into the base currency and extracts the publication
//! year.

use crate::currency::ExchangeRates;
use crate::error::{Result, VacancyError};
use crate::models::{RawRow, VacancyRecord};

/// Normalizes raw rows against a shared rate source
#[derive(Clone, Copy)]
pub struct RecordNormalizer<'a> {
    rates: &'a dyn ExchangeRates,
}

impl<'a> RecordNormalizer<'a> {
    /// Create a normalizer bound to a rate source
    #[must_use]
    pub const fn new(rates: &'a dyn ExchangeRates) -> Self {
        Self { rates }
    }

    /// Normalize one row
    ///
    /// # Errors
    /// - `MalformedRow` if a salary bound is not a non-negative number
    /// - `MalformedDate` if `published_at` does not start with a four digit year
    /// - `MissingRate` if the rate history has no quote for the month
    /// - `UnknownCurrency` if the rate source has never heard of the currency;
    ///   this one is fatal for the run
    pub fn normalize(&self, row: &RawRow) -> Result<VacancyRecord> {
        let salary_from = parse_salary("salary_from", &row.salary_from)?;
        let salary_to = parse_salary("salary_to", &row.salary_to)?;
        let year = parse_year(&row.published_at)?;
        let rate = self.rates.rate_at(&row.salary_currency, &row.published_at)?;

        // Floor the average before converting; the order changes rounding.
        let average = ((salary_from + salary_to) / 2.0).floor();
        let salary = (average * rate).floor() as u64;

        Ok(VacancyRecord {
            title: row.name.clone(),
            salary,
            area: row.area_name.clone(),
            year,
        })
    }

    /// Normalize a stream of rows, dropping rows with row-level errors
    ///
    /// Returns the records and the number of rows dropped here. Fatal errors,
    /// from either the row source or the currency lookup, abort the stream.
    pub fn normalize_all<I>(&self, rows: I) -> Result<(Vec<VacancyRecord>, usize)>
    where
        I: IntoIterator<Item = Result<RawRow>>,
    {
        let mut records = Vec::new();
        let mut dropped = 0;

        for row in rows {
            match self.normalize(&row?) {
                Ok(record) => records.push(record),
                Err(e) if e.is_recoverable() => {
                    dropped += 1;
                    log::debug!("Dropping row: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        Ok((records, dropped))
    }
}

fn parse_salary(column: &str, value: &str) -> Result<f64> {
    match value.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
        _ => Err(VacancyError::MalformedRow(format!(
            "invalid {column} '{value}'"
        ))),
    }
}

/// Parse the year from the first four characters of a publication timestamp
///
/// # Errors
/// Returns `MalformedDate` if the prefix is shorter than four characters or
/// contains a non-digit
pub fn parse_year(published_at: &str) -> Result<i32> {
    let prefix = published_at
        .get(..4)
        .filter(|p| p.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| VacancyError::MalformedDate(published_at.to_string()))?;

    prefix
        .parse::<i32>()
        .map_err(|_| VacancyError::MalformedDate(published_at.to_string()))
}
