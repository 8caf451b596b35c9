//! Domain models for the vacancy pipeline
//!
//! `RawRow` is the validated shape of one CSV row; `VacancyRecord` is the
//! normalized, currency-converted record the aggregator consumes.

pub mod raw_row;
pub mod vacancy;

// Re-export commonly used types
pub use raw_row::{HeaderMap, RawRow, REQUIRED_COLUMNS};
pub use vacancy::VacancyRecord;
