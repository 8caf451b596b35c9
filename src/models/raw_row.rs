//! Raw vacancy row model
//!
//! A `RawRow` holds the six required columns of one CSV row as text. Rows are
//! validated when they are built from a CSV record: the arity must match the
//! header and no required field may be blank. Values are stored verbatim, so
//! ` Москва` and `Москва` stay distinct areas.

use csv::StringRecord;

use crate::error::{Result, VacancyError};

/// Columns every vacancy file must provide, in canonical order
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "name",
    "salary_from",
    "salary_to",
    "salary_currency",
    "area_name",
    "published_at",
];

/// Positions of the required columns within a particular CSV header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    indices: [usize; 6],
    arity: usize,
}

impl HeaderMap {
    /// Resolve the required columns against a header record
    ///
    /// A UTF-8 byte order mark on the first header is ignored.
    ///
    /// # Errors
    /// Returns `MissingColumn` for the first required column that is absent
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}'))
            .collect();

        let mut indices = [0usize; 6];
        for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = names.iter().position(|n| *n == column).ok_or_else(|| {
                VacancyError::MissingColumn {
                    column: column.to_string(),
                }
            })?;
        }

        Ok(Self {
            indices,
            arity: headers.len(),
        })
    }

    /// Number of fields in the header
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.arity
    }
}

/// One vacancy row with its required fields as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Vacancy title
    pub name: String,
    /// Lower salary bound
    pub salary_from: String,
    /// Upper salary bound
    pub salary_to: String,
    /// Currency code of the salary bounds
    pub salary_currency: String,
    /// City or region
    pub area_name: String,
    /// Publication timestamp, starting with `YYYY`
    pub published_at: String,
}

impl RawRow {
    /// Build a row from a CSV record
    ///
    /// # Errors
    /// Returns `MalformedRow` if the record's arity differs from the header or
    /// a required field is blank
    pub fn from_record(record: &StringRecord, header: &HeaderMap) -> Result<Self> {
        if record.len() != header.arity {
            return Err(VacancyError::MalformedRow(format!(
                "expected {} fields, found {}",
                header.arity,
                record.len()
            )));
        }

        let field = |slot: usize| -> Result<String> {
            let value = record.get(header.indices[slot]).unwrap_or_default();
            if value.trim().is_empty() {
                return Err(VacancyError::MalformedRow(format!(
                    "empty {}",
                    REQUIRED_COLUMNS[slot]
                )));
            }
            Ok(value.to_string())
        };

        Ok(Self {
            name: field(0)?,
            salary_from: field(1)?,
            salary_to: field(2)?,
            salary_currency: field(3)?,
            area_name: field(4)?,
            published_at: field(5)?,
        })
    }

    /// Required fields in `REQUIRED_COLUMNS` order
    #[must_use]
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.name,
            &self.salary_from,
            &self.salary_to,
            &self.salary_currency,
            &self.area_name,
            &self.published_at,
        ]
    }
}
