//! Single-pass vacancy aggregation
//!
//! The aggregator folds canonical records into per-year and per-city salary
//! buckets. Folding is commutative, so records may arrive in any order and
//! partial aggregators may be merged.

use std::cmp::Reverse;

use indexmap::IndexMap;
use itertools::Itertools;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::error::Result;
use crate::models::VacancyRecord;

use super::projection::{CityProjections, ProjectionSet};

/// Number of cities kept in the city projections
pub const DEFAULT_TOP_CITIES: usize = 10;

/// Minimum share of all postings a city needs to appear in the city projections
pub const MIN_CITY_SHARE: f64 = 0.01;

/// Running salary total and record count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalaryBucket {
    /// Sum of the salaries seen
    pub total: u128,
    /// Number of salaries seen
    pub count: usize,
}

impl SalaryBucket {
    /// Record one salary
    pub fn push(&mut self, salary: u64) {
        self.total += u128::from(salary);
        self.count += 1;
    }

    /// Combine with another bucket
    pub fn merge(&mut self, other: Self) {
        self.total += other.total;
        self.count += other.count;
    }

    /// Integer (floored) mean, 0 for an empty bucket
    #[must_use]
    pub fn mean(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        u64::try_from(self.total / self.count as u128).unwrap_or(u64::MAX)
    }
}

/// Per-year statistics of one year's records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearSummary {
    /// Publication year
    pub year: i32,
    /// Mean salary over all records of the year
    pub mean_salary: u64,
    /// Number of records of the year
    pub count: usize,
    /// Mean salary over role-matching records, 0 if there are none
    pub role_mean_salary: u64,
    /// Number of role-matching records
    pub role_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct YearBuckets {
    overall: SalaryBucket,
    role: SalaryBucket,
}

/// Salary buckets keyed by publication year
#[derive(Debug, Clone, Default)]
pub struct YearAccumulator {
    buckets: FxHashMap<i32, YearBuckets>,
}

impl YearAccumulator {
    /// Create an empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record; `matches_role` selects the role bucket as well
    pub fn fold(&mut self, record: &VacancyRecord, matches_role: bool) {
        let buckets = self.buckets.entry(record.year).or_default();
        buckets.overall.push(record.salary);
        if matches_role {
            buckets.role.push(record.salary);
        }
    }

    /// Combine with another accumulator
    pub fn merge(&mut self, other: Self) {
        for (year, theirs) in other.buckets {
            let ours = self.buckets.entry(year).or_default();
            ours.overall.merge(theirs.overall);
            ours.role.merge(theirs.role);
        }
    }

    /// One summary per year, ascending by year
    #[must_use]
    pub fn summaries(&self) -> Vec<YearSummary> {
        self.buckets
            .iter()
            .map(|(&year, buckets)| YearSummary {
                year,
                mean_salary: buckets.overall.mean(),
                count: buckets.overall.count,
                role_mean_salary: buckets.role.mean(),
                role_count: buckets.role.count,
            })
            .sorted_by_key(|summary| summary.year)
            .collect()
    }
}

/// Salary buckets keyed by city, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct CityAccumulator {
    buckets: IndexMap<String, SalaryBucket, FxBuildHasher>,
    total: usize,
}

impl CityAccumulator {
    /// Create an empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record
    pub fn fold(&mut self, record: &VacancyRecord) {
        // Avoid allocating a key for cities already seen
        match self.buckets.get_mut(record.area.as_str()) {
            Some(bucket) => bucket.push(record.salary),
            None => {
                let mut bucket = SalaryBucket::default();
                bucket.push(record.salary);
                self.buckets.insert(record.area.clone(), bucket);
            }
        }
        self.total += 1;
    }

    /// Combine with another accumulator; cities new to `self` are appended in
    /// `other`'s order
    pub fn merge(&mut self, other: Self) {
        for (city, theirs) in other.buckets {
            self.buckets.entry(city).or_default().merge(theirs);
        }
        self.total += other.total;
    }

    /// Number of records folded
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Whether a city with `count` postings passes both city filters
    fn qualifies(&self, count: usize, share: f64) -> bool {
        // count >= 1% of total, evaluated exactly in integers
        count * 100 >= self.total && share >= MIN_CITY_SHARE
    }

    /// Build the salary-by-city and share-by-city projections
    ///
    /// Both lists draw from the same set of qualifying cities and are sorted
    /// descending with a stable sort, so ties keep first-seen order.
    #[must_use]
    pub fn finalize(&self, top_cities: usize) -> CityProjections {
        let qualifying = self
            .buckets
            .iter()
            .filter_map(|(city, bucket)| {
                let share = round_share(bucket.count, self.total);
                self.qualifies(bucket.count, share)
                    .then_some((city, bucket.mean(), share))
            })
            .collect_vec();

        let share_by_city = qualifying
            .iter()
            .sorted_by(|a, b| b.2.total_cmp(&a.2))
            .take(top_cities)
            .map(|(city, _, share)| ((*city).clone(), *share))
            .collect();

        let salary_by_city = qualifying
            .iter()
            .sorted_by_key(|(_, mean, _)| Reverse(*mean))
            .take(top_cities)
            .map(|(city, mean, _)| ((*city).clone(), *mean))
            .collect();

        CityProjections {
            salary_by_city,
            share_by_city,
        }
    }
}

/// `count / total` rounded to four decimal places
///
/// Rounding works on the exact binary value of the quotient, so a share that
/// prints as a decimal tie rounds the way its stored value falls.
#[must_use]
pub fn round_share(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let share = count as f64 / total as f64;
    format!("{share:.4}").parse().unwrap_or(share)
}

/// Folds canonical records into the six projections in a single pass
#[derive(Debug, Clone)]
pub struct Aggregator {
    role: String,
    top_cities: usize,
    years: YearAccumulator,
    cities: CityAccumulator,
}

impl Aggregator {
    /// Create an aggregator for the given role substring
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            top_cities: DEFAULT_TOP_CITIES,
            years: YearAccumulator::new(),
            cities: CityAccumulator::new(),
        }
    }

    /// Set the length of the city projections
    #[must_use]
    pub fn with_top_cities(mut self, top_cities: usize) -> Self {
        self.top_cities = top_cities;
        self
    }

    /// Target role substring
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Number of records folded
    #[must_use]
    pub const fn total(&self) -> usize {
        self.cities.total()
    }

    /// Fold one record
    pub fn fold(&mut self, record: &VacancyRecord) {
        self.years.fold(record, record.matches_role(&self.role));
        self.cities.fold(record);
    }

    /// Fold every record of an iterator
    pub fn fold_all<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a VacancyRecord>,
    {
        for record in records {
            self.fold(record);
        }
    }

    /// Combine with another aggregator over the same role
    pub fn merge(&mut self, other: Self) {
        debug_assert_eq!(self.role, other.role);
        self.years.merge(other.years);
        self.cities.merge(other.cities);
    }

    /// Compute the six projections
    pub fn finalize(self) -> Result<ProjectionSet> {
        ProjectionSet::from_parts(self.years.summaries(), self.cities.finalize(self.top_cities))
    }
}
