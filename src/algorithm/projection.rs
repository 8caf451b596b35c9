//! The six statistical projections produced by one aggregation run

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Result, VacancyError};

use super::aggregator::YearSummary;

/// Salary-by-city and share-by-city projections
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CityProjections {
    /// City → mean salary, descending by salary
    pub salary_by_city: IndexMap<String, u64>,
    /// City → share of postings, descending by share
    pub share_by_city: IndexMap<String, f64>,
}

/// Statistics for one run over one input set
///
/// Year-keyed projections are ordered ascending by year; city-keyed
/// projections keep their own descending sort order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectionSet {
    /// Mean salary per year
    pub salary_by_year: BTreeMap<i32, u64>,
    /// Number of vacancies per year
    pub count_by_year: BTreeMap<i32, usize>,
    /// Mean salary per year for the selected role
    pub salary_by_year_for_role: BTreeMap<i32, u64>,
    /// Number of vacancies per year for the selected role
    pub count_by_year_for_role: BTreeMap<i32, usize>,
    /// Mean salary per city, top cities only
    pub salary_by_city: IndexMap<String, u64>,
    /// Share of vacancies per city, top cities only
    pub share_by_city: IndexMap<String, f64>,
}

impl ProjectionSet {
    /// Assemble the projections from per-year summaries and city projections
    ///
    /// # Errors
    /// Returns `PartitionOverlap` if two summaries cover the same year
    pub fn from_parts<I>(summaries: I, cities: CityProjections) -> Result<Self>
    where
        I: IntoIterator<Item = YearSummary>,
    {
        let mut projections = Self {
            salary_by_city: cities.salary_by_city,
            share_by_city: cities.share_by_city,
            ..Self::default()
        };

        for summary in summaries {
            if projections.count_by_year.contains_key(&summary.year) {
                return Err(VacancyError::PartitionOverlap(summary.year));
            }
            projections.salary_by_year.insert(summary.year, summary.mean_salary);
            projections.count_by_year.insert(summary.year, summary.count);
            projections
                .salary_by_year_for_role
                .insert(summary.year, summary.role_mean_salary);
            projections
                .count_by_year_for_role
                .insert(summary.year, summary.role_count);
        }

        Ok(projections)
    }

    /// Whether the run saw no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count_by_year.is_empty()
    }

    /// Total number of records behind the projections
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.count_by_year.values().sum()
    }

    /// Serialize the projections as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn write_mapping<K, V, I>(f: &mut fmt::Formatter<'_>, entries: I) -> fmt::Result
where
    K: fmt::Display,
    V: fmt::Display,
    I: IntoIterator<Item = (K, V)>,
{
    write!(f, "{{")?;
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{key}: {value}")?;
    }
    write!(f, "}}")
}

impl fmt::Display for ProjectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salary level by year: ")?;
        write_mapping(f, &self.salary_by_year)?;
        write!(f, "\nVacancy count by year: ")?;
        write_mapping(f, &self.count_by_year)?;
        write!(f, "\nSalary level by year for the selected role: ")?;
        write_mapping(f, &self.salary_by_year_for_role)?;
        write!(f, "\nVacancy count by year for the selected role: ")?;
        write_mapping(f, &self.count_by_year_for_role)?;
        write!(f, "\nSalary level by city (descending): ")?;
        write_mapping(
            f,
            self.salary_by_city.iter().map(|(city, salary)| (format!("'{city}'"), salary)),
        )?;
        write!(f, "\nVacancy share by city (descending): ")?;
        write_mapping(
            f,
            self.share_by_city.iter().map(|(city, share)| (format!("'{city}'"), share)),
        )
    }
}
